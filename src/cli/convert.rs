//! Convert command implementation.
//!
//! Loads the palette, then loads, converts and keeps the indexed form of each
//! input image in order, and finally writes the selected sprite format.

use std::path::PathBuf;

use clap::Args;

use crate::context::ConversionContext;
use crate::decode::load_source_image;
use crate::dither::{DiffusionKernel, DitherEngine, DEFAULT_LEVEL};
use crate::encode::{save_sprites, write_table_json, OutputPaths, SpriteEntry, SpriteFormat, TileLayout};
use crate::error::{Result, SprError, Stage, StageError, StageExt};
use crate::manifest::Manifest;
use crate::output::{display_path, plural, Printer};
use crate::parser::{load_animation_list, load_image_list, read_palette, InputEntry, DEFAULT_RANGE};
use crate::transparency::{auto_crop, DEFAULT_ALPHA_THRESHOLD};
use crate::types::MAX_COLOURS;

fn parse_format(s: &str) -> std::result::Result<SpriteFormat, String> {
    s.parse().map_err(|e: SprError| e.to_string())
}

fn parse_kernel(s: &str) -> std::result::Result<DiffusionKernel, String> {
    s.parse().map_err(|e: SprError| e.to_string())
}

/// Convert images into palette-indexed sprite files
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input image, or the list file with -b/-m
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Verbose output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format: RAW, BMP, HSPR, SSPR, SSPR2, JSPR, JSPR2
    #[arg(short, long, value_parser = parse_format)]
    pub format: Option<SpriteFormat>,

    /// Diffusion algorithm (FldStnbrg, JrvJdcNnk, Stucki, Burkes, Fan, Sierra3,
    /// Sierra2, Sierra24A, Atkinson, ShiauFan4, ShiauFan5)
    #[arg(short, long, value_parser = parse_kernel)]
    pub diffuse: Option<DiffusionKernel>,

    /// Diffusion level, 0..100
    #[arg(short = 'l', long, value_parser = clap::value_parser!(i32).range(0..=100))]
    pub dflevel: Option<i32>,

    /// Palette file (default: output name with .pal)
    #[arg(short, long)]
    pub palette: Option<PathBuf>,

    /// Largest channel value stored in the palette file, 1..255
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..))]
    pub range: Option<u8>,

    /// Output data file name
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output table file name (default: output name with .tab)
    #[arg(short = 't', long)]
    pub outtab: Option<PathBuf>,

    /// The input is a list of images
    #[arg(short = 'b', long, conflicts_with = "framelist")]
    pub batchlist: bool,

    /// The input is a list of animations, each a list of images
    #[arg(short = 'm', long)]
    pub framelist: bool,

    /// Alpha below this value is transparent
    #[arg(long)]
    pub threshold: Option<u8>,

    /// Number of colours the palette must contain
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..=256))]
    pub colors: Option<u16>,

    /// Also write the table entries as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Defaults file (default: palspr.yaml in the working directory, if present)
    #[arg(long)]
    pub manifest: Option<PathBuf>,
}

/// Fully resolved settings for one conversion run.
#[derive(Debug, Clone)]
pub struct ConvertPlan {
    pub format: SpriteFormat,
    pub kernel: DiffusionKernel,
    pub level: i32,
    pub palette: PathBuf,
    pub range: u8,
    pub threshold: u8,
    pub colors: usize,
    pub inputs: Vec<InputEntry>,
    pub outputs: OutputPaths,
    pub tiles: Option<TileLayout>,
    pub json: Option<PathBuf>,
    /// Notes gathered while reading list files.
    pub notes: Vec<String>,
}

impl ConvertPlan {
    /// Merge arguments over manifest values over defaults and read any list file.
    pub fn resolve(args: &ConvertArgs, manifest: Option<&Manifest>) -> Result<Self> {
        let defaults = Manifest::default();
        let manifest = manifest.unwrap_or(&defaults);

        let format = match args.format {
            Some(format) => format,
            None => manifest.sprite_format()?.unwrap_or_default(),
        };
        let kernel = match args.diffuse {
            Some(kernel) => kernel,
            None => manifest.diffusion_kernel()?.unwrap_or_default(),
        };

        let batch = args.batchlist || args.framelist;
        let (inputs, notes) = if batch {
            if args.inputs.len() != 1 {
                return Err(SprError::bad_format("A batch run takes exactly one list file"));
            }
            let list = if args.framelist {
                load_animation_list(&args.inputs[0])?
            } else {
                load_image_list(&args.inputs[0])?
            };
            (list.entries, list.notes)
        } else {
            (args.inputs.iter().map(InputEntry::single).collect(), Vec::new())
        };

        if inputs.is_empty() {
            return Err(SprError::bad_format("No input images given"));
        }
        if format.single_image_only() && inputs.len() != 1 {
            return Err(SprError::LimitExceeded {
                message: format!("{} supports only one input image, got {}", format, inputs.len()),
                help: None,
            });
        }

        let tiles = match format {
            SpriteFormat::Raw | SpriteFormat::Bmp if batch => Some(TileLayout::from_fields(inputs[0].fields)?),
            SpriteFormat::Raw | SpriteFormat::Bmp if inputs.len() > 1 => {
                return Err(SprError::BadFormat {
                    message: format!("{} output of several images needs a batch list", format),
                    help: Some("Use -b with a list whose first line gives the tile grid".to_string()),
                })
            }
            _ => None,
        };

        let mut outputs = match &args.output {
            Some(path) => OutputPaths::for_data(path.clone()),
            None => OutputPaths::for_input(&inputs[0].path, format),
        };
        if let Some(table) = &args.outtab {
            outputs.table = table.clone();
        }

        let palette = args
            .palette
            .clone()
            .or_else(|| manifest.palette.clone())
            .unwrap_or_else(|| outputs.data.with_extension("pal"));

        let level = args.dflevel.or(manifest.level).unwrap_or(DEFAULT_LEVEL);
        if !(0..=100).contains(&level) {
            return Err(SprError::bad_format(format!("Dither level {} is outside 0..100", level)));
        }
        let range = args.range.or(manifest.range).unwrap_or(DEFAULT_RANGE);
        if range == 0 {
            return Err(SprError::bad_format("Palette range must be at least 1"));
        }
        let colors = args
            .colors
            .map(usize::from)
            .or(manifest.colors)
            .unwrap_or(MAX_COLOURS);
        if colors == 0 || colors > MAX_COLOURS {
            return Err(SprError::limit(format!("Palette size {} is outside 1..256", colors)));
        }

        Ok(Self {
            format,
            kernel,
            level,
            palette,
            range,
            threshold: args
                .threshold
                .or(manifest.threshold)
                .unwrap_or(DEFAULT_ALPHA_THRESHOLD),
            colors,
            inputs,
            outputs,
            tiles,
            json: args.json.clone(),
            notes,
        })
    }
}

/// Run every stage of a conversion, tagging failures with their stage.
pub fn execute(
    plan: &ConvertPlan,
    ctx: &mut ConversionContext,
) -> std::result::Result<Vec<SpriteEntry>, StageError> {
    for note in &plan.notes {
        ctx.note("palspr::list::short-line", note.clone());
    }

    ctx.verbose("Loading", &format!("palette {}", display_path(&plan.palette)));
    let loaded = read_palette(&plan.palette, plan.range, plan.colors).stage(Stage::Palette)?;
    if loaded.clamped > 0 {
        ctx.warn(
            "palspr::palette::clamped",
            format!(
                "{} palette channels exceed range {} and were clamped to 255",
                loaded.clamped, plan.range
            ),
        );
    }
    if loaded.trailing > 0 {
        ctx.warn(
            "palspr::palette::trailing",
            format!("{} trailing palette bytes ignored", loaded.trailing),
        );
    }
    let palette = loaded.palette;
    let engine = DitherEngine::new(&palette, plan.kernel, plan.level);

    let mut images = Vec::with_capacity(plan.inputs.len());
    for (index, entry) in plan.inputs.iter().enumerate() {
        ctx.verbose("Loading", &display_path(&entry.path));
        let mut source = load_source_image(&entry.path, plan.threshold).stage(Stage::Load)?;
        source.apply_crop(entry.crop);
        if plan.format.needs_frame_data() {
            let frame = auto_crop(&source, entry.fields).stage(Stage::Load)?;
            if frame.s_width == 0 || frame.s_height == 0 {
                ctx.warn(
                    "palspr::frame::empty",
                    format!("{} is fully transparent", display_path(&entry.path)),
                );
            }
            source.frame = Some(frame);
        }

        let crop = source.crop;
        ctx.verbose(
            "Converting",
            &format!(
                "image {} ({}x{} at {},{}) with {}",
                index, crop.width, crop.height, crop.x, crop.y, engine.kernel()
            ),
        );
        images.push(engine.convert(&source).stage(Stage::Convert)?);
    }

    ctx.status(
        "Saving",
        &format!(
            "{} ({}, {})",
            display_path(&plan.outputs.data),
            plan.format,
            plural(images.len(), "image", "images")
        ),
    );
    let entries = save_sprites(plan.format, &images, &palette, &plan.outputs, plan.tiles)
        .stage(Stage::Save)?;

    if let Some(json) = &plan.json {
        ctx.verbose("Writing", &display_path(json));
        write_table_json(json, &entries).stage(Stage::Save)?;
    }

    Ok(entries)
}

pub fn run(args: ConvertArgs, printer: &Printer) -> std::result::Result<(), StageError> {
    let cwd = std::env::current_dir().map_err(|e| StageError {
        stage: Stage::Options,
        error: SprError::ReadFailure {
            path: PathBuf::from("."),
            message: e.to_string(),
        },
    })?;
    let manifest = Manifest::find(args.manifest.as_deref(), &cwd).stage(Stage::Options)?;
    let plan = ConvertPlan::resolve(&args, manifest.as_ref()).stage(Stage::Options)?;

    let mut ctx = ConversionContext::new(args.verbose, *printer);
    let result = execute(&plan, &mut ctx);
    ctx.report();
    result.map(|_| ())
}
