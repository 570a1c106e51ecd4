//! Interactive location resolution for a draft issue report.
//!
//! Reads slash commands from stdin, drives the resolver session, and
//! reprints the state once background lookups settle. On `/confirm` the
//! resolved location is emitted as JSON on stdout, wrapped in a full
//! issue draft when title, category, and description were provided.

use anyhow::Context;
use nagarmitra_core::{
    parse_manual_coordinates, AppConfig, IssueCategory, IssueDraft, ResolvedLocation,
};
use nagarmitra_resolver::{ResolverSession, ResolverView};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Default, clap::Args)]
pub(crate) struct LocateArgs {
    /// Title for the emitted issue draft.
    #[arg(long)]
    pub title: Option<String>,
    /// Category slug for the emitted issue draft (see `categories`).
    #[arg(long)]
    pub category: Option<String>,
    /// Description for the emitted issue draft.
    #[arg(long)]
    pub description: Option<String>,
}

struct DraftFields {
    title: String,
    category: IssueCategory,
    description: String,
}

/// Run the interactive resolution loop until the user confirms or quits.
///
/// # Errors
///
/// Returns an error if the draft arguments are inconsistent, stdin cannot
/// be read, or the confirmed draft fails validation.
pub(crate) async fn run_locate(config: &AppConfig, args: &LocateArgs) -> anyhow::Result<()> {
    let fields = draft_fields(args)?;

    let session = ResolverSession::from_config(config);
    session.settled().await;

    render(&session.view().await);
    print_help();

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        let Some(line) = lines.next_line().await.context("reading stdin")? else {
            return Ok(());
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let (command, rest) = split_command(input);
        match command {
            "/find" => {
                session.query_edited(rest).await;
            }
            "/pick" => {
                let Ok(index) = rest.parse::<usize>() else {
                    println!("usage: /pick <index>");
                    continue;
                };
                let view = session.view().await;
                let Some(entry) = view.suggestions.get(index).cloned() else {
                    println!("no suggestion at index {index}");
                    continue;
                };
                session.suggestion_chosen(&entry).await;
            }
            "/gps" => {
                session.locate_device().await;
            }
            "/map" => {
                let Some(coordinates) = parse_manual_coordinates(rest) else {
                    println!("could not read coordinates, expected \"lat, lng\"");
                    continue;
                };
                session.map_picked(coordinates).await;
            }
            "/manual" => {
                session.manual_submitted(rest).await;
            }
            "/confirm" => {
                let Some(location) = session.confirm().await else {
                    println!("nothing to confirm yet");
                    continue;
                };
                return emit(location, fields.as_ref());
            }
            "/view" => {}
            "/help" => {
                print_help();
                continue;
            }
            "/quit" | "/exit" => return Ok(()),
            other => {
                println!("unknown command {other}, try /help");
                continue;
            }
        }

        session.settled().await;
        render(&session.view().await);
    }
}

fn draft_fields(args: &LocateArgs) -> anyhow::Result<Option<DraftFields>> {
    match (&args.title, &args.category, &args.description) {
        (None, None, None) => Ok(None),
        (Some(title), Some(slug), Some(description)) => {
            let category = slug
                .parse::<IssueCategory>()
                .map_err(|e| anyhow::anyhow!("{e}, see `nagarmitra categories`"))?;
            Ok(Some(DraftFields {
                title: title.clone(),
                category,
                description: description.clone(),
            }))
        }
        _ => anyhow::bail!("provide --title, --category, and --description together, or none"),
    }
}

fn emit(location: ResolvedLocation, fields: Option<&DraftFields>) -> anyhow::Result<()> {
    match fields {
        Some(fields) => {
            let mut draft = IssueDraft::new();
            draft.title = fields.title.clone();
            draft.category = Some(fields.category);
            draft.description = fields.description.clone();
            draft.set_location(location);
            draft
                .validate()
                .map_err(|e| anyhow::anyhow!("draft is not submittable: {e}"))?;
            tracing::info!(id = %draft.id, "issue draft ready");
            println!("{}", serde_json::to_string_pretty(&draft)?);
        }
        None => println!("{}", serde_json::to_string_pretty(&location)?),
    }
    Ok(())
}

fn render(view: &ResolverView) {
    println!();
    println!("phase: {:?}  provider: {}", view.phase, view.availability);
    if !view.query.is_empty() {
        println!("query: {}", view.query);
    }
    for (index, entry) in view.suggestions.iter().enumerate() {
        println!("  [{index}] {}", entry.description);
    }
    if let Some(candidate) = &view.selection {
        let pending = if view.address_pending {
            ", address pending"
        } else {
            ""
        };
        match candidate.coordinates {
            Some(coordinates) => {
                println!(
                    "location: {} ({}{pending})",
                    candidate.address,
                    coordinates.as_summary()
                );
            }
            None => println!("location: {} (no coordinates)", candidate.address),
        }
    }
    if let Some(error) = &view.error {
        println!("! {error}");
    }
    if view.can_confirm {
        println!("ready: /confirm to use this location");
    }
}

fn print_help() {
    println!("commands:");
    println!("  /find <text>        search for a place");
    println!("  /pick <index>       choose a suggestion from the last search");
    println!("  /gps                use the device position");
    println!("  /map <lat, lng>     drop a pin at coordinates");
    println!("  /manual <lat, lng>  enter coordinates directly");
    println!("  /view               reprint the current state");
    println!("  /confirm            commit the resolved location");
    println!("  /quit               exit without confirming");
}

fn split_command(input: &str) -> (&str, &str) {
    match input.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (input, ""),
    }
}
