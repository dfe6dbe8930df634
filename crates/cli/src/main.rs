//! CLI tool for assembling a student competency report and exporting it to
//! PowerPoint.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use livret_core::descriptions::DESCRIPTIONS_FILE;
use livret_core::paginate::LineEntry;
use livret_core::svg::scene_to_svg;
use livret_core::{
    CanvasSize, Descriptions, GestureKind, ItemKey, LayoutConfig, OverlayAnchor, PageId, Rgb,
    SectionField, SectionKey, Session,
};
use livret_pptx::{DeckReader, ExportOptions, ReportExporter};
use std::fs;
use std::path::{Path, PathBuf};

/// Build a student's competency booklet and export it as a slide deck.
#[derive(Parser, Debug)]
#[command(name = "livret")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Project file
    #[arg(short, long, global = true, default_value = "projet.json")]
    project: PathBuf,

    /// Maximum entries (headers and items) per page
    #[arg(short = 'l', long, global = true)]
    lines_per_page: Option<usize>,

    /// Preview canvas size, e.g. 900x520 (stored in the project)
    #[arg(long, global = true)]
    canvas: Option<String>,

    /// Domain descriptions file (default: DOMAINES.txt next to the project)
    #[arg(long, global = true)]
    descriptions: Option<PathBuf>,

    /// Directory with the cover banner images
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty project
    Init {
        /// Catalog to load right away
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Overwrite an existing project
        #[arg(long)]
        force: bool,
    },
    /// Load a competency catalog (clears the selection and images), or print it
    Catalog {
        /// Catalog file; without it the current catalog is printed
        file: Option<PathBuf>,
    },
    /// List the competencies of a subdomain that are not selected yet
    Available {
        domain: String,
        subdomain: String,
    },
    /// Add competencies of one subdomain as a new dated batch
    Add {
        domain: String,
        subdomain: String,
        /// Competency texts as written in the catalog
        texts: Vec<String>,
        /// Add every competency not selected yet
        #[arg(long, conflicts_with = "texts")]
        all: bool,
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        year: Option<String>,
    },
    /// Remove selected competencies
    Remove {
        domain: String,
        subdomain: String,
        #[arg(required = true)]
        texts: Vec<String>,
    },
    /// Print the pagination
    Pages,
    /// Render one page of the preview
    Preview {
        /// Page number in the flat page list (1-based)
        #[arg(long, default_value = "1")]
        page: usize,
        /// Show the page holding this item instead
        #[arg(long, num_args = 3, value_names = ["DOMAIN", "SUBDOMAIN", "TEXT"])]
        item: Option<Vec<String>>,
        /// Show the cover page (uses --assets for the banner)
        #[arg(long, conflicts_with = "item")]
        cover: bool,
        /// Write the page as SVG
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Manage the images placed on pages
    Image {
        #[command(subcommand)]
        action: ImageAction,
    },
    /// Change a domain's body font size and colour
    Style {
        domain: String,
        #[arg(long)]
        size: Option<u32>,
        /// Colour as #RRGGBB
        #[arg(long)]
        color: Option<String>,
    },
    /// Show or edit the student's personal information
    Info {
        #[arg(long)]
        nom: Option<String>,
        #[arg(long)]
        prenom: Option<String>,
        #[arg(long)]
        naissance: Option<String>,
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// Show or edit a school-year section (TPS, PS, MS, GS)
    Section {
        key: String,
        /// field=value, with field one of annee, ecole, enseignants
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        fields: Vec<String>,
        #[arg(long)]
        photo: Option<PathBuf>,
        #[arg(long)]
        bilan: Option<String>,
        #[arg(long)]
        bilan2: Option<String>,
        /// Enable or disable the second summary
        #[arg(long)]
        second: Option<bool>,
        /// Override the completed flag
        #[arg(long)]
        completed: Option<bool>,
        /// Reset the section
        #[arg(long)]
        clear: bool,
    },
    /// Export the report as a .pptx deck
    Export {
        /// Output file (default: <Prénom>_<Nom>.pptx next to the project)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Do not prefix items with the student's first name
        #[arg(long)]
        no_personalize: bool,
    },
    /// List the slides of a .pptx deck
    Inspect {
        deck: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ImageAction {
    /// Add images to a page
    Add {
        #[arg(long, default_value = "1")]
        page: usize,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Move an image by an offset in preview pixels
    Move {
        #[command(flatten)]
        target: ImageTarget,
        #[arg(long, allow_negative_numbers = true)]
        dx: f32,
        #[arg(long, allow_negative_numbers = true)]
        dy: f32,
    },
    /// Set an image's size in preview pixels
    Resize {
        #[command(flatten)]
        target: ImageTarget,
        #[arg(long)]
        width: f32,
        #[arg(long)]
        height: f32,
    },
    /// Replay a pointer drag on a page, from X,Y to X,Y
    Drag {
        #[arg(long, default_value = "1")]
        page: usize,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Resize instead of move
        #[arg(long)]
        resize: bool,
    },
}

#[derive(clap::Args, Debug)]
struct ImageTarget {
    /// Page number in the flat page list (1-based)
    #[arg(long, conflicts_with = "domain")]
    page: Option<usize>,
    /// Image shown on every first page of a domain
    #[arg(long)]
    domain: Option<String>,
    /// Image index on that page
    #[arg(long, default_value = "0")]
    index: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_filter(args.verbose)),
    )
    .init();

    let mut layout = LayoutConfig::new();
    if let Some(lines) = args.lines_per_page {
        layout = layout.with_max_lines(lines);
    }

    if let Command::Init { catalog, force } = &args.command {
        return init(&args, layout, catalog.as_deref(), *force);
    }
    if let Command::Inspect { deck, json } = &args.command {
        return inspect(deck, *json);
    }

    log::debug!("Opening project {}", args.project.display());
    let mut session = Session::open(&args.project, layout)
        .with_context(|| format!("Failed to open project {}", args.project.display()))?;
    log::debug!(
        "{} selected item(s) on {} page(s)",
        session.state().selection.len(),
        session.pagination().page_count()
    );
    if let Some(canvas) = &args.canvas {
        session.set_canvas(CanvasSize::parse(canvas)?);
    }

    let changed = run(&args, &mut session)?;
    if changed || args.canvas.is_some() {
        log::debug!("Saving project {}", args.project.display());
        session
            .save(&args.project)
            .with_context(|| format!("Failed to save {}", args.project.display()))?;
    }
    Ok(())
}

/// Default log filter when `RUST_LOG` is unset.
fn log_filter(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Apply one command. Returns true when the project must be saved.
fn run(args: &Args, session: &mut Session) -> Result<bool> {
    match &args.command {
        Command::Init { .. } | Command::Inspect { .. } => Ok(false),
        Command::Catalog { file: Some(file) } => {
            session
                .load_catalog(file)
                .with_context(|| format!("Failed to read catalog {}", file.display()))?;
            let catalog = &session.state().catalog;
            println!(
                "Loaded {} domains, {} competencies",
                catalog.domains().len(),
                catalog.competency_count()
            );
            Ok(true)
        }
        Command::Catalog { file: None } => {
            print_catalog(session);
            Ok(false)
        }
        Command::Available { domain, subdomain } => {
            for text in session.available_for(domain, subdomain) {
                println!("{}", text);
            }
            Ok(false)
        }
        Command::Add {
            domain,
            subdomain,
            texts,
            all,
            month,
            year,
        } => {
            if month.is_some() || year.is_some() {
                let draft = session.state().timestamp.clone();
                session.set_timestamp(
                    month.as_deref().unwrap_or(&draft.month),
                    year.as_deref().unwrap_or(&draft.year),
                );
            }
            let texts: Vec<String> = if *all {
                session
                    .available_for(domain, subdomain)
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            } else {
                texts.clone()
            };
            let outcome = session.add_competencies(domain, subdomain, &texts)?;
            println!(
                "Batch {}: {} added, {} already selected",
                outcome.batch, outcome.added, outcome.duplicates
            );
            // The batch counter advances even when nothing was added.
            Ok(true)
        }
        Command::Remove {
            domain,
            subdomain,
            texts,
        } => {
            let keys: Vec<ItemKey> = texts
                .iter()
                .map(|text| ItemKey::new(domain.as_str(), subdomain.as_str(), text.as_str()))
                .collect();
            let removed = session.remove(&keys);
            println!("Removed {} item(s)", removed);
            Ok(removed > 0)
        }
        Command::Pages => {
            print_pages(session);
            Ok(false)
        }
        Command::Preview {
            page,
            item,
            cover,
            output,
        } => {
            match item.as_deref() {
                _ if *cover => {}
                Some([domain, subdomain, text]) => {
                    let key = ItemKey::new(domain.as_str(), subdomain.as_str(), text.as_str());
                    session.goto_item(&key)?;
                }
                _ if session.pagination().is_empty() => {}
                _ => {
                    let id = page_id(session, *page)?;
                    session.goto_page(&id)?;
                }
            }
            let scene = if *cover {
                session.render_cover(args.assets.as_deref())
            } else {
                session.render_preview()
            };
            match output {
                Some(path) => {
                    let svg = scene_to_svg(&scene)?;
                    fs::write(path, svg)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("{}", scene.caption);
                }
                None => {
                    println!("{}", scene.caption);
                    for text in scene.texts() {
                        println!("  {}", text);
                    }
                }
            }
            if scene.overflow {
                eprintln!("Warning: content runs past the bottom of the canvas");
            }
            Ok(false)
        }
        Command::Image { action } => image(session, action),
        Command::Style {
            domain,
            size,
            color,
        } => {
            let color = color.as_deref().map(Rgb::from_hex).transpose()?;
            session.set_domain_style(domain, *size, color)?;
            Ok(true)
        }
        Command::Info {
            nom,
            prenom,
            naissance,
            photo,
        } => {
            let info = session.personal_mut();
            let changed = nom.is_some() || prenom.is_some() || naissance.is_some() || photo.is_some();
            if let Some(v) = nom {
                info.last_name = v.trim().to_string();
            }
            if let Some(v) = prenom {
                info.first_name = v.trim().to_string();
            }
            if let Some(v) = naissance {
                info.birthdate = v.trim().to_string();
            }
            if let Some(v) = photo {
                info.photo = Some(v.clone());
            }
            if changed {
                info.mark_completed();
            }
            for line in info.cover_lines() {
                println!("{}", line);
            }
            println!("Complet: {}", if info.completed { "oui" } else { "non" });
            Ok(changed)
        }
        Command::Section {
            key,
            fields,
            photo,
            bilan,
            bilan2,
            second,
            completed,
            clear,
        } => {
            let key: SectionKey = key.parse()?;
            let mut updates = Vec::new();
            for assignment in fields {
                let (name, value) = assignment
                    .split_once('=')
                    .with_context(|| format!("Expected FIELD=VALUE, got '{}'", assignment))?;
                updates.push((name.parse::<SectionField>()?, value.to_string()));
            }

            let record = session.sections_mut().get_mut(key);
            if *clear {
                record.clear();
            }
            for (field, value) in &updates {
                record.set_field(*field, value);
            }
            if let Some(path) = photo {
                record.photo = Some(path.clone());
            }
            if let Some(text) = bilan {
                record.summary = text.clone();
            }
            if let Some(text) = bilan2 {
                record.second_summary = text.clone();
            }
            if let Some(enabled) = second {
                record.second_enabled = *enabled;
            }
            if let Some(done) = completed {
                record.set_completed(*done);
            }

            println!("{} ({})", key.label(), key.code());
            for (label, value) in record.filled_fields() {
                println!("  {}: {}", label, value);
            }
            println!("  Complète: {}", if record.completed { "oui" } else { "non" });
            Ok(*clear
                || !updates.is_empty()
                || photo.is_some()
                || bilan.is_some()
                || bilan2.is_some()
                || second.is_some()
                || completed.is_some())
        }
        Command::Export {
            output,
            no_personalize,
        } => {
            export(args, session, output.as_deref(), *no_personalize)?;
            Ok(false)
        }
    }
}

fn init(args: &Args, layout: LayoutConfig, catalog: Option<&Path>, force: bool) -> Result<()> {
    if args.project.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            args.project.display()
        );
    }
    let mut session = Session::new(layout);
    if let Some(canvas) = &args.canvas {
        session.set_canvas(CanvasSize::parse(canvas)?);
    }
    if let Some(path) = catalog {
        session
            .load_catalog(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    }
    session
        .save(&args.project)
        .with_context(|| format!("Failed to create {}", args.project.display()))?;
    println!("Created {}", args.project.display());
    Ok(())
}

/// Page id of a 1-based position in the flat page list.
fn page_id(session: &Session, page: usize) -> Result<PageId> {
    let count = session.pagination().page_count();
    page.checked_sub(1)
        .and_then(|i| session.pagination().flat().get(i))
        .cloned()
        .with_context(|| format!("No page {} (the report has {} page(s))", page, count))
}

fn image(session: &mut Session, action: &ImageAction) -> Result<bool> {
    match action {
        ImageAction::Add { page, files } => {
            let id = page_id(session, *page)?;
            session.goto_page(&id)?;
            let results = session.add_images(files)?;
            let mut added = 0;
            for (path, result) in files.iter().zip(results) {
                match result {
                    Ok(index) => {
                        println!("{} -> {} #{}", path.display(), id, index);
                        added += 1;
                    }
                    Err(e) => eprintln!("Skipped {}: {}", path.display(), e),
                }
            }
            Ok(added > 0)
        }
        ImageAction::Move { target, dx, dy } => {
            let anchor = anchor(session, target)?;
            session.move_image(&anchor, target.index, *dx, *dy)?;
            Ok(true)
        }
        ImageAction::Resize {
            target,
            width,
            height,
        } => {
            let anchor = anchor(session, target)?;
            session.resize_image(&anchor, target.index, *width, *height)?;
            Ok(true)
        }
        ImageAction::Drag {
            page,
            from,
            to,
            resize,
        } => {
            let id = page_id(session, *page)?;
            session.goto_page(&id)?;
            let (x0, y0) = parse_point(from)?;
            let (x1, y1) = parse_point(to)?;
            let kind = if *resize {
                GestureKind::Resize
            } else {
                GestureKind::Move
            };
            if !session.pointer_down(kind, x0, y0) {
                bail!("No image under {},{} on {}", x0, y0, id);
            }
            let moved = session.pointer_move(x1, y1);
            session.pointer_up();
            moved?;
            Ok(true)
        }
    }
}

fn anchor(session: &Session, target: &ImageTarget) -> Result<OverlayAnchor> {
    match (&target.domain, target.page) {
        (Some(domain), _) => Ok(OverlayAnchor::Domain(domain.clone())),
        (None, page) => Ok(OverlayAnchor::Page(page_id(session, page.unwrap_or(1))?)),
    }
}

fn parse_point(s: &str) -> Result<(f32, f32)> {
    let (x, y) = s
        .split_once(',')
        .with_context(|| format!("Expected X,Y, got '{}'", s))?;
    Ok((
        x.trim().parse().with_context(|| format!("Bad x in '{}'", s))?,
        y.trim().parse().with_context(|| format!("Bad y in '{}'", s))?,
    ))
}

fn print_catalog(session: &Session) {
    let state = session.state();
    for domain in state.catalog.domains() {
        println!(
            "{} ({}, {} pt)",
            domain.name, domain.color, domain.body_font_size
        );
        for sub in &domain.subdomains {
            let available = session.available_for(&domain.name, &sub.name).len();
            println!(
                "  {} [{}/{} selected]",
                sub.name,
                sub.competencies.len() - available,
                sub.competencies.len()
            );
        }
    }
}

fn print_pages(session: &Session) {
    let pagination = session.pagination();
    println!("{}", session.caption());
    for (n, id) in pagination.flat().iter().enumerate() {
        println!("{:>3}. {}", n + 1, id);
        let Some(page) = pagination.page(id) else {
            continue;
        };
        for entry in &page.entries {
            match entry {
                LineEntry::Header(sub) => println!("       [{}]", sub),
                LineEntry::Item(item) => println!(
                    "       - {}{}",
                    item.text,
                    item.timestamp
                        .as_deref()
                        .map(|ts| format!(" ({})", ts))
                        .unwrap_or_default()
                ),
            }
        }
        let images = session.state().overlays.for_page(id).count();
        if images > 0 {
            println!("       {} image(s)", images);
        }
    }
    for anchor in session.orphaned_overlays() {
        println!("Orphaned images: {}", anchor);
    }
}

fn export(args: &Args, session: &Session, output: Option<&Path>, no_personalize: bool) -> Result<()> {
    let project_dir = args
        .project
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let descriptions_path = args
        .descriptions
        .clone()
        .unwrap_or_else(|| project_dir.join(DESCRIPTIONS_FILE));
    log::debug!("Domain descriptions from {}", descriptions_path.display());
    let descriptions = Descriptions::load_optional(&descriptions_path)
        .with_context(|| format!("Failed to read {}", descriptions_path.display()))?;

    let mut options = ExportOptions::default()
        .with_personalize(!no_personalize)
        .with_descriptions(descriptions);
    if let Some(dir) = &args.assets {
        options = options.with_assets_dir(dir);
    }

    let path = match output {
        Some(path) => path.to_path_buf(),
        None => project_dir.join(session.state().personal.default_export_filename()),
    };

    log::debug!("Exporting to {}", path.display());
    let exporter = ReportExporter::new(session.layout().clone(), options);
    let report = exporter
        .export_to_path(session.state(), session.pagination(), &path)
        .with_context(|| format!("Failed to export {}", path.display()))?;

    println!("Exported {} slides to {}", report.slides, path.display());
    for skipped in &report.skipped_images {
        eprintln!("Skipped image {}: {}", skipped.path.display(), skipped.reason);
    }
    if report.forced_items > 0 {
        eprintln!(
            "Warning: {} item(s) taller than a slide were placed anyway",
            report.forced_items
        );
    }
    Ok(())
}

fn inspect(path: &Path, json: bool) -> Result<()> {
    log::debug!("Inspecting {}", path.display());
    let outline = DeckReader::new()
        .open(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if json {
        let json = serde_json::to_string_pretty(&outline).context("Failed to serialize outline")?;
        println!("{}", json);
        return Ok(());
    }

    for slide in &outline.slides {
        println!("Slide {} ({} picture(s))", slide.number, slide.pictures);
        for line in slide.lines() {
            println!("  {}", line);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_enables_debug_logging() {
        let args = Args::try_parse_from(["livret", "-v", "pages"]).unwrap();
        assert_eq!(log_filter(args.verbose), "debug");
        let args = Args::try_parse_from(["livret", "pages"]).unwrap();
        assert_eq!(log_filter(args.verbose), "warn");
    }

    #[test]
    fn test_preview_cover_flag() {
        let args =
            Args::try_parse_from(["livret", "--assets", "img", "preview", "--cover"]).unwrap();
        assert!(matches!(args.command, Command::Preview { cover: true, .. }));
        assert_eq!(args.assets, Some(PathBuf::from("img")));

        let conflict = Args::try_parse_from([
            "livret", "preview", "--cover", "--item", "Agir", "Agir", "courir",
        ]);
        assert!(conflict.is_err());
    }
}
