use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use glyphatlas::{
    preview::{render_text, PreviewOptions},
    Atlas, AtlasSizing, CharSet, Description, Encoding, Field, FieldConfig, FieldSpec,
    FontdueSource, OutputPaths, PackerConfig, PackerKind,
};
use image::GrayImage;
use log::{info, LevelFilter};
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::console::{description_table, shade_to_ansi};
mod console;

#[derive(Parser)]
#[command(
    name = "glyphatlas",
    about = "Bitmap font atlas generator",
    long_about = "Generates a glyph atlas PNG and a binary glyph description from a TrueType/OpenType font.\n\
        Description records are, in order: [codepoint] x y width height bearing_x bearing_y advance [advance_y],\n\
        preceded by an optional line spacing header. The default layout is little endian\n\
        u32 line spacing followed by u32 u32 u32 u32 i32 i32 u32 u32 records."
)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// No log output
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Rasterize a font into an atlas and a description file
    Generate {
        /// TrueType/OpenType font, or a zip archive containing one
        font: PathBuf,
        #[command(flatten)]
        run: RunArgs,
        /// Widest atlas allowed
        #[arg(long, default_value_t = 1024)]
        max_width: u32,
        /// Tallest atlas allowed; unbounded when omitted
        #[arg(long)]
        max_height: Option<u32>,
        /// Pixels kept free between glyphs
        #[arg(long, default_value_t = 0)]
        padding: u32,
        /// Packing strategy: shelf or corner
        #[arg(long, default_value = "shelf")]
        packer: PackerKind,
        /// Atlas size policy: max-width, tight, pow2 or square
        #[arg(long, default_value = "max-width")]
        sizing: AtlasSizing,
    },
    /// Print the records of a description file
    Inspect {
        description: PathBuf,
        #[command(flatten)]
        layout: LayoutArgs,
        #[command(flatten)]
        charset: CharsetArgs,
    },
    /// Draw text with a generated atlas and description
    Preview {
        /// Font the artifacts were generated from (used to find them)
        font: PathBuf,
        #[command(flatten)]
        run: RunArgs,
        #[arg(short, long)]
        text: String,
        #[arg(short, long, default_value = "preview.png")]
        output: PathBuf,
        /// Canvas size as WxH
        #[arg(long, default_value = "1000x1000", value_name = "WxH")]
        canvas: String,
        /// Distance of the first pen position from the top-left corner
        #[arg(long, default_value_t = 100)]
        margin: u32,
        /// Also print the result as shaded terminal cells
        #[arg(long)]
        terminal: bool,
    },
}

/// Options naming and shaping one generation run.
#[derive(Args)]
struct RunArgs {
    /// Assets directory; textures/ and fonts/ are created below it
    #[arg(long, default_value = ".")]
    basedir: PathBuf,
    /// Pixel height of the font
    #[arg(long, default_value_t = 48)]
    height: u32,
    #[command(flatten)]
    charset: CharsetArgs,
    #[command(flatten)]
    layout: LayoutArgs,
    /// Atlas PNG path instead of <basedir>/textures/<name>.png
    #[arg(long)]
    atlas: Option<PathBuf>,
    /// Description path instead of <basedir>/fonts/<name>.ftd
    #[arg(long)]
    description: Option<PathBuf>,
}

impl RunArgs {
    fn paths(&self, font: &Path, charset: &CharSet) -> OutputPaths {
        let mut paths = OutputPaths::new(&self.basedir, font, self.height, charset.label());
        if let Some(atlas) = &self.atlas {
            paths.atlas = atlas.clone();
        }
        if let Some(description) = &self.description {
            paths.description = description.clone();
        }
        paths
    }
}

#[derive(Args)]
struct CharsetArgs {
    /// 8-bit encoding whose 256 byte values are rendered: latin-1, ascii or cp437
    #[arg(long, default_value = "latin-1", conflicts_with_all = ["chars", "text_chars"])]
    encoding: Encoding,
    /// Codepoint list instead of an encoding, e.g. 32-126,0x400-0x4ff
    #[arg(long, conflicts_with = "text_chars")]
    chars: Option<String>,
    /// Render exactly the characters of this string
    #[arg(long = "charset-text", id = "text_chars")]
    text_chars: Option<String>,
}

impl CharsetArgs {
    fn build(&self) -> Result<CharSet> {
        let set = match (&self.chars, &self.text_chars) {
            (Some(ranges), _) => CharSet::from_ranges(ranges)?,
            (None, Some(text)) => CharSet::from_chars(text)?,
            (None, None) => CharSet::from_encoding(self.encoding),
        };
        Ok(set)
    }
}

#[derive(Args)]
struct LayoutArgs {
    /// Byte order of every multi-byte value: little or big
    #[arg(long, default_value = "little")]
    endian: glyphatlas::Endianness,
    /// Start from the 16-bit layout without header and advance_y
    #[arg(long)]
    compact: bool,
    /// Override a field, e.g. bearing_x=i16; optional fields accept "none"
    #[arg(long = "field", value_name = "NAME=SPEC")]
    fields: Vec<String>,
    /// Leave out the line spacing header
    #[arg(long)]
    no_line_spacing: bool,
    /// Leave out the vertical advance
    #[arg(long)]
    no_advance_y: bool,
    /// Store each glyph's codepoint first in its record, e.g. u32
    #[arg(long, value_name = "SPEC")]
    codepoint: Option<FieldSpec>,
}

impl LayoutArgs {
    fn build(&self) -> Result<FieldConfig> {
        let mut config = if self.compact {
            FieldConfig::compact()
        } else {
            FieldConfig::default()
        };
        config.endianness = self.endian;
        if self.no_line_spacing {
            config.line_spacing = None;
        }
        if self.no_advance_y {
            config.advance_y = None;
        }
        if self.codepoint.is_some() {
            config.codepoint = self.codepoint;
        }
        for entry in &self.fields {
            let (name, spec) = entry
                .split_once('=')
                .ok_or_else(|| anyhow!("--field expects NAME=SPEC, got '{entry}'"))?;
            let field: Field = name.parse()?;
            let spec = match spec.trim() {
                "none" if field.is_optional() => None,
                other => Some(other.parse::<FieldSpec>()?),
            };
            config.set(field, spec)?;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Cmd::Generate {
            font,
            run,
            max_width,
            max_height,
            padding,
            packer,
            sizing,
        } => {
            let charset = run.charset.build()?;
            let fields = run.layout.build()?;
            let packer = packer.build(PackerConfig {
                max_width,
                max_height,
                padding,
                sizing,
            });
            let source = FontdueSource::open(&font)
                .with_context(|| format!("failed to load font {}", font.display()))?;
            let generated =
                glyphatlas::generate(&source, &charset, run.height, packer.as_ref(), &fields)?;

            let paths = run.paths(&font, &charset);
            paths.create_dirs()?;
            let bytes = generated.description_bytes(&fields)?;
            fs::write(&paths.description, &bytes)
                .with_context(|| format!("failed to write {}", paths.description.display()))?;
            save_atlas(&generated.atlas, &paths.atlas)?;
            eprintln!(
                "Generated {}x{} atlas -> {}",
                generated.atlas.width(),
                generated.atlas.height(),
                paths.atlas.display()
            );
            eprintln!(
                "Generated {} glyph records ({} bytes) -> {}",
                generated.description.len(),
                bytes.len(),
                paths.description.display()
            );
        }
        Cmd::Inspect {
            description,
            layout,
            charset,
        } => {
            let fields = layout.build()?;
            let charset = charset.build()?;
            let bytes = fs::read(&description)
                .with_context(|| format!("failed to read {}", description.display()))?;
            let parsed = Description::from_bytes(&bytes, &fields)
                .with_context(|| format!("failed to decode {}", description.display()))?;
            println!("Description: {}", description.display());
            println!(
                "  Layout: {} endian, {}-byte header, {}-byte records",
                fields.endianness,
                fields.header_len(),
                fields.stride()
            );
            if let Some(spacing) = parsed.line_spacing {
                println!("  Line spacing: {spacing}");
            }
            println!("  Records: {}", parsed.len());
            print!("{}", description_table(&parsed, &charset));
        }
        Cmd::Preview {
            font,
            run,
            text,
            output,
            canvas,
            margin,
            terminal,
        } => {
            let charset = run.charset.build()?;
            let fields = run.layout.build()?;
            let paths = run.paths(&font, &charset);
            let (canvas_width, canvas_height) = parse_size(&canvas)?;

            let bytes = fs::read(&paths.description)
                .with_context(|| format!("failed to read {}", paths.description.display()))?;
            let description = Description::from_bytes(&bytes, &fields)?;
            let atlas = load_atlas(&paths.atlas)?;
            let options = PreviewOptions {
                canvas_width,
                canvas_height,
                margin: (margin, margin),
            };
            let rendered = render_text(&atlas, &description, &charset, &text, &options)?;
            save_atlas(&rendered, &output)?;
            if terminal {
                println!("{}", shade_to_ansi(&rendered, 2));
            }
            eprintln!("Rendered {:?} -> {}", text, output.display());
        }
    }
    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::Off,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };
    if let Err(e) = TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("failed to initialize logging: {e}");
    }
}

fn save_atlas(atlas: &Atlas, path: &Path) -> Result<()> {
    let (w, h) = (atlas.width(), atlas.height());
    let img = GrayImage::from_raw(w, h, atlas.pixels().to_vec())
        .ok_or_else(|| anyhow!("atlas buffer does not match {w}x{h}"))?;
    img.save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote {w}x{h} image {}", path.display());
    Ok(())
}

fn load_atlas(path: &Path) -> Result<Atlas> {
    let img = image::open(path)
        .with_context(|| format!("failed to read {}", path.display()))?
        .into_luma8();
    let (w, h) = img.dimensions();
    Ok(Atlas::from_raw(w, h, img.into_raw())?)
}

fn parse_size(s: &str) -> Result<(u32, u32)> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| anyhow!("invalid size (expected WxH): {s}"))?;
    let w: u32 = w.parse().map_err(|_| anyhow!("invalid width: {w}"))?;
    let h: u32 = h.parse().map_err(|_| anyhow!("invalid height: {h}"))?;
    if w == 0 || h == 0 {
        bail!("size must be > 0x0, got {s}");
    }
    Ok((w, h))
}
