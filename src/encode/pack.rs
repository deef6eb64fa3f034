//! Row packers shared by the sprite encoders.

/// Longest run a single signed-byte header can describe.
pub const RUN_LIMIT: usize = 127;

/// Marks the end of one row in SmallSprite/JontySprite data.
pub const END_OF_ROW: u8 = 0;

/// Marks the end of one image in SmallSprite/JontySprite data (-128 as a signed byte).
pub const END_OF_IMAGE: u8 = 0x80;

/// Bit-pack a row of palette indices, most significant field first.
///
/// With `bits` of 5 or more a pixel already fills a byte and the row is copied
/// unchanged. A trailing partial byte is left-aligned and zero-filled.
pub fn pack_bits(indices: &[u8], bits: u8) -> Vec<u8> {
    let per_byte = (8 / bits.max(1)) as usize;
    if per_byte <= 1 {
        return indices.to_vec();
    }

    let mask = (1u8 << bits) - 1;
    indices
        .chunks(per_byte)
        .map(|chunk| {
            chunk.iter().enumerate().fold(0u8, |byte, (k, &index)| {
                byte | ((index & mask) << (bits as usize * (per_byte - 1 - k)))
            })
        })
        .collect()
}

/// Length of the opaque run starting at `start`.
fn opaque_run(transparent: &[bool], start: usize) -> usize {
    transparent[start..].iter().take_while(|&&t| !t).count()
}

/// Length of the transparent run starting at `start`.
fn transparent_run(transparent: &[bool], start: usize) -> usize {
    transparent[start..].iter().take_while(|&&t| t).count()
}

/// Encode one row as SmallSprite runs.
///
/// Opaque runs are a positive count followed by that many indices, transparent
/// runs a negative count. Runs longer than `RUN_LIMIT` are split. A transparent
/// run reaching the end of the row is dropped, and the row ends with `END_OF_ROW`.
pub fn pack_small_row(out: &mut Vec<u8>, indices: &[u8], transparent: &[bool]) {
    let width = indices.len();
    let mut i = 0;

    while i < width {
        let run = opaque_run(transparent, i);
        for chunk in indices[i..i + run].chunks(RUN_LIMIT) {
            out.push(chunk.len() as u8);
            out.extend_from_slice(chunk);
        }
        i += run;

        let run = transparent_run(transparent, i);
        if i + run < width {
            let mut left = run;
            while left > 0 {
                let part = left.min(RUN_LIMIT);
                out.push((-(part as i8)) as u8);
                left -= part;
            }
        }
        i += run;
    }

    out.push(END_OF_ROW);
}

/// Encode one row as HugeSprite runs.
///
/// Runs alternate opaque then transparent, each prefixed by its length as a
/// little-endian `i32`; either may be zero. Only opaque runs carry pixel bytes.
pub fn pack_huge_row(out: &mut Vec<u8>, indices: &[u8], transparent: &[bool]) {
    let width = indices.len();
    let mut i = 0;

    while i < width {
        let run = opaque_run(transparent, i);
        out.extend_from_slice(&(run as i32).to_le_bytes());
        out.extend_from_slice(&indices[i..i + run]);
        i += run;

        let run = transparent_run(transparent, i);
        out.extend_from_slice(&(run as i32).to_le_bytes());
        i += run;
    }
}
