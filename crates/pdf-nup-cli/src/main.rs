mod logger;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use logger::CliLogger;
use pdf_nup::constants::{DEFAULT_PREVIEW_SCALE, pt_to_mm};
use pdf_nup::{BuildParams, NupStatistics};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pdfnup", about = "Lay out PDF pages and images in a grid", version)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose PDFs and images into an N-up PDF
    Nup {
        /// Input PDF or image file(s), in output order
        #[arg(short, long, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Append every PDF in this folder (sorted by name)
        #[arg(long)]
        folder: Option<PathBuf>,

        /// Output PDF file
        #[arg(short, long, conflicts_with = "output_dir")]
        output: Option<PathBuf>,

        /// Save as the next free `<name>_<n>.pdf` in this folder
        #[arg(long)]
        output_dir: Option<PathBuf>,

        #[command(flatten)]
        build: BuildArgs,

        /// Show statistics only, don't generate PDF
        #[arg(long)]
        stats_only: bool,
    },

    /// Render one page of the N-up output to a PNG
    Preview {
        /// Input PDF or image file(s), in output order
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Output page to render (1-based)
        #[arg(long, default_value = "1")]
        page: usize,

        /// Pixels per point
        #[arg(long, default_value_t = DEFAULT_PREVIEW_SCALE)]
        scale: f32,

        /// Stop composing after this many output pages (defaults to --page)
        #[arg(long)]
        max_pages: Option<usize>,

        /// Output PNG file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        build: BuildArgs,
    },

    /// Lay out images four per landscape page under a title
    Images {
        /// Input image file(s), in output order
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Title printed on every page
        #[arg(long)]
        title: String,

        /// Paper size
        #[arg(long, default_value = "a4", value_enum)]
        paper: PaperArg,

        /// Output PDF file (defaults to `<title>.pdf`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the default build parameters as JSON
    Config {
        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Build parameter overrides shared by `nup` and `preview`
#[derive(Args)]
struct BuildArgs {
    /// Load build parameters from a JSON file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output paper size
    #[arg(long, value_enum)]
    paper: Option<PaperArg>,

    /// Landscape output pages
    #[arg(long)]
    landscape: bool,

    /// Fixed number of rows (turns off automatic grids)
    #[arg(long)]
    rows: Option<usize>,

    /// Fixed number of columns (turns off automatic grids)
    #[arg(long)]
    cols: Option<usize>,

    /// Choose the grid automatically from the minimum slide width
    #[arg(long, conflicts_with_all = ["rows", "cols"])]
    auto: bool,

    /// Minimum cell width in mm for automatic grids
    #[arg(long)]
    min_slide_width: Option<f32>,

    /// Page margin in mm
    #[arg(long)]
    margin: Option<f32>,

    /// Gap between cells in mm
    #[arg(long)]
    gap: Option<f32>,

    /// Place full pages instead of trimming surrounding whitespace
    #[arg(long)]
    no_trim: bool,

    /// Channel value below which a pixel counts as content (0-255)
    #[arg(long)]
    trim_threshold: Option<u8>,

    /// Leave out the `i / N` page footers
    #[arg(long)]
    no_page_numbers: bool,

    /// Stamp the running page index in each cell
    #[arg(long)]
    cell_indices: bool,

    /// Footer font size in points
    #[arg(long)]
    page_number_font: Option<f32>,

    /// Cell index font size in points
    #[arg(long)]
    cell_index_font: Option<f32>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A3,
    A4,
    Letter,
}

impl From<PaperArg> for pdf_nup::PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A3 => Self::A3,
            PaperArg::A4 => Self::A4,
            PaperArg::Letter => Self::Letter,
        }
    }
}

impl BuildArgs {
    async fn to_params(&self) -> Result<BuildParams> {
        let mut params = match &self.config {
            Some(path) => BuildParams::load(path)
                .await
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => BuildParams::default(),
        };

        if let Some(paper) = self.paper {
            params.paper_size = paper.into();
        }
        if self.landscape {
            params.orientation = pdf_nup::Orientation::Landscape;
        }
        if self.rows.is_some() || self.cols.is_some() {
            params.layout.auto_readable = false;
        }
        if let Some(rows) = self.rows {
            params.layout.rows = rows;
        }
        if let Some(cols) = self.cols {
            params.layout.cols = cols;
        }
        if self.auto {
            params.layout.auto_readable = true;
        }
        if let Some(width) = self.min_slide_width {
            params.layout.min_slide_width_mm = width;
        }
        if let Some(margin) = self.margin {
            params.layout.margin_mm = margin;
        }
        if let Some(gap) = self.gap {
            params.layout.gap_mm = gap;
        }
        if self.no_trim {
            params.trim_whitespace = false;
        }
        if let Some(threshold) = self.trim_threshold {
            params.trim_threshold = threshold;
        }
        if self.no_page_numbers {
            params.draw_page_numbers = false;
        }
        if self.cell_indices {
            params.draw_cell_indices = true;
        }
        if let Some(size) = self.page_number_font {
            params.page_number_font_size_pt = size;
        }
        if let Some(size) = self.cell_index_font {
            params.cell_index_font_size_pt = size;
        }

        params.validate()?;
        Ok(params)
    }
}

fn print_statistics(stats: &NupStatistics, params: &BuildParams) {
    let grid = params.grid();
    println!("N-up Statistics:");
    println!("  Input files: {}", stats.input_files);
    if stats.skipped_files > 0 {
        println!("  Skipped files: {}", stats.skipped_files);
    }
    println!("  Source pages: {}", stats.source_pages);
    println!(
        "  Grid: {} x {} ({:.1} x {:.1} mm cells)",
        stats.rows,
        stats.cols,
        pt_to_mm(grid.cell_width_pt),
        pt_to_mm(grid.cell_height_pt)
    );
    println!("  Output pages: {}", stats.output_pages);
    println!("  Empty cells: {}", stats.empty_slots);
}

/// Where `nup` writes its result
fn resolve_output(
    output: Option<PathBuf>,
    output_dir: Option<&Path>,
    folder: Option<&Path>,
) -> Result<PathBuf> {
    match (output, output_dir) {
        (Some(path), _) => Ok(path),
        (None, Some(dir)) => {
            let base = pdf_nup::default_base_name(folder.unwrap_or(dir));
            Ok(pdf_nup::next_available_path(dir, &base)?)
        }
        (None, None) => bail!("Specify an output file (-o) or folder (--output-dir)"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    CliLogger::new(CliLogger::level_for_verbosity(cli.verbose)).init()?;

    match cli.command {
        Commands::Nup {
            mut input,
            folder,
            output,
            output_dir,
            build,
            stats_only,
        } => {
            if let Some(folder) = &folder {
                let pdfs = pdf_nup::collect_pdfs_in_dir(folder)
                    .await
                    .with_context(|| format!("Failed to list {}", folder.display()))?;
                log::info!("Found {} PDF(s) in {}", pdfs.len(), folder.display());
                input.extend(pdfs);
            }
            if input.is_empty() {
                bail!("No input files given (use -i or --folder)");
            }

            let params = build.to_params().await?;

            let stats = pdf_nup::statistics_for_files(&input, &params).await?;
            print_statistics(&stats, &params);

            if stats_only {
                return Ok(());
            }

            let output = resolve_output(output, output_dir.as_deref(), folder.as_deref())?;
            let document = pdf_nup::build_nup_from_multiple(&input, &params, None).await?;
            document
                .save(&output)
                .await
                .with_context(|| format!("Failed to save {}", output.display()))?;
            println!("{} page(s) → {}", document.page_count(), output.display());
        }

        Commands::Preview {
            input,
            page,
            scale,
            max_pages,
            output,
            build,
        } => {
            if page == 0 {
                bail!("Pages are numbered from 1");
            }
            let params = build.to_params().await?;
            let max_pages = max_pages.unwrap_or(page).max(page);

            let document = pdf_nup::generate_preview(&input, &params, max_pages).await?;
            if page > document.page_count() {
                bail!(
                    "Page {} requested but the preview has {} page(s)",
                    page,
                    document.page_count()
                );
            }

            let rasterizer = pdf_nup::raster::PdfiumRasterizer::new()
                .context("Previews need the pdfium library")?;
            let image = document.render_page(page - 1, scale, &rasterizer)?;
            image
                .save_with_format(&output, image::ImageFormat::Png)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!(
                "Page {} ({}x{} px) → {}",
                page,
                image.width(),
                image.height(),
                output.display()
            );
        }

        Commands::Images {
            input,
            title,
            paper,
            output,
        } => {
            let output = match output {
                Some(path) => path,
                None => PathBuf::from(pdf_nup::sheets::default_file_name(&title)?),
            };
            let document =
                pdf_nup::build_image_sheets_from_files(&input, &title, paper.into()).await?;
            document
                .save(&output)
                .await
                .with_context(|| format!("Failed to save {}", output.display()))?;
            println!(
                "{} image(s) on {} page(s) → {}",
                input.len(),
                document.page_count(),
                output.display()
            );
        }

        Commands::Config { output } => {
            BuildParams::default().save(&output).await?;
            println!("Default parameters → {}", output.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[tokio::test]
    async fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "pdfnup", "nup", "-i", "a.pdf", "-o", "out.pdf", "--rows", "3", "--cols", "1",
            "--paper", "letter", "--no-trim", "--cell-indices",
        ]);
        let Commands::Nup { build, .. } = cli.command else {
            panic!("Expected nup command");
        };

        let params = build.to_params().await.unwrap();
        assert!(!params.layout.auto_readable);
        assert_eq!((params.layout.rows, params.layout.cols), (3, 1));
        assert_eq!(params.paper_size, pdf_nup::PaperSize::Letter);
        assert!(!params.trim_whitespace);
        assert!(params.draw_cell_indices);
        assert!(params.draw_page_numbers);
    }

    #[test]
    fn test_output_dir_uses_folder_name() {
        let dir = std::env::temp_dir();
        let path = resolve_output(None, Some(&dir), Some(Path::new("/notes/biology"))).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("biology_"));
        assert!(resolve_output(None, None, None).is_err());
    }
}
