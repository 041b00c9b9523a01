use clap::{Parser, Subcommand};
use log::info;
use std::fs;
use stylerepo_lib::events::{EmitterIdentity, StyleEvent, StyleEventKind};
use stylerepo_lib::parser::html;
use stylerepo_lib::repository::options::{DEFAULT_EMITTER_TYPE, DEFAULT_MARKER_ATTRIBUTE};
use stylerepo_lib::{Lookup, RepositoryOptions, StyleRepository};

#[derive(Parser)]
#[command(name = "stylerepo")]
#[command(about = "Read and edit named style sheets inside an HTML document")]
struct Args {
    /// Input HTML file.
    input: String,

    /// Attribute that carries a style sheet's name.
    #[arg(long, default_value = DEFAULT_MARKER_ATTRIBUTE)]
    marker: String,

    /// Id reported in miss events.
    #[arg(long)]
    emitter_id: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a declaration value.
    Get {
        #[arg(long)]
        sheet: String,
        #[arg(long)]
        selector: String,
        #[arg(long)]
        property: String,
        /// Report misses on stderr.
        #[arg(long)]
        strict: bool,
    },
    /// Set a declaration and print the updated document.
    Set {
        #[arg(long)]
        sheet: String,
        #[arg(long)]
        selector: String,
        #[arg(long)]
        property: String,
        #[arg(long)]
        value: String,
    },
    /// Replace a rule's declarations and print the updated document.
    Rule {
        #[arg(long)]
        sheet: String,
        #[arg(long)]
        selector: String,
        #[arg(long)]
        text: String,
    },
    /// Print the serialized text of a style sheet.
    Dump {
        #[arg(long)]
        sheet: String,
    },
}

fn main() {
    env_logger::init();

    // parse the args given in terminal
    let args: Args = Args::parse();

    let html_content = match fs::read_to_string(&args.input) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading HTML file: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&args, &html_content) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args, html_content: &str) -> stylerepo_lib::Result<()> {
    let document = html::create_dom_tree(html_content);
    info!("parsed {} ({} style sheets)", args.input, document.style_sheets().len());

    for kind in [StyleEventKind::UnknownStylesheet, StyleEventKind::UnknownCssRule] {
        document.add_listener(kind, report_miss);
    }

    let mut emitter = EmitterIdentity::new(DEFAULT_EMITTER_TYPE);
    if let Some(id) = &args.emitter_id {
        emitter = emitter.with_id(id.as_str());
    }
    let options = RepositoryOptions::default()
        .with_marker_attribute(args.marker.as_str())
        .with_emitter(emitter);
    let repository = StyleRepository::with_options(&document, options);

    match &args.command {
        Command::Get {
            sheet,
            selector,
            property,
            strict,
        } => {
            let lookup = Lookup::from(*strict);
            if let Some(value) = repository.get_property(sheet, selector, property, lookup) {
                println!("{}", value);
            }
        }
        Command::Set {
            sheet,
            selector,
            property,
            value,
        } => {
            repository.set_property(sheet, selector, property, value)?;
            println!("{}", html::serialize_document(&document));
        }
        Command::Rule {
            sheet,
            selector,
            text,
        } => {
            repository.create_or_update_rule(sheet, selector, text)?;
            println!("{}", html::serialize_document(&document));
        }
        Command::Dump { sheet } => {
            if let Some(text) = repository.stylesheet_text(sheet) {
                println!("{}", text);
            }
        }
    }
    Ok(())
}

fn report_miss(event: &StyleEvent) {
    match serde_json::to_string(event) {
        Ok(line) => eprintln!("{}", line),
        Err(e) => eprintln!("Error encoding event: {}", e),
    }
}
