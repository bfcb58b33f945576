mod init;
pub use init::cmd_init;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Local};
use regex::Regex;

/// Global override for the deck directory (set by -C flag)
static DECK_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::deck_io::{self, DeckError};
use crate::io::lock::DeckLock;
use crate::io::{config_io, state};
use crate::model::config::DeckConfig;
use crate::model::deck::Deck;
use crate::model::gesture::{DragKind, DragSession, DropTarget};
use crate::model::outline::LeafId;
use crate::ops::outline_ops::{self, OutlineError};
use crate::ops::playground_ops::{self, PLAYGROUND_ID};
use crate::ops::project_ops::{self, ProjectError};
use crate::ops::relocate::{NoOpReason, RelocationStatus};
use crate::ops::token::{TOKEN_SEPARATOR, decode_token, encode_token, is_valid_id};
use crate::ops::{check, container_ops, export, relocate, search, selection_ops};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;

    // Store -C override for deck_root()
    if let Some(ref dir) = cli.deck_dir {
        let abs = std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?;
        if let Ok(mut slot) = DECK_DIR_OVERRIDE.lock() {
            slot.replace(abs);
        }
    }

    match cli.command {
        // Init is normally handled in main.rs before deck discovery
        Commands::Init(args) => cmd_init(args, cli.deck_dir.as_deref().map(Path::new)),

        // Read commands
        Commands::Show => cmd_show(json),
        Commands::Check => cmd_check(json),
        Commands::Search(args) => cmd_search(args, json),
        Commands::Token(args) => cmd_token(args, json),

        // Write commands
        Commands::Section(args) => cmd_section(args, json),
        Commands::Subsection(args) => cmd_subsection(args, json),
        Commands::Unit(args) => cmd_unit(args, json),
        Commands::Playground(args) => cmd_playground(args, json),
        Commands::Select(args) => cmd_select(args, json),
        Commands::Mv(args) => cmd_mv(args, json),

        // Projects and export
        Commands::Project(args) => cmd_project(args, json),
        Commands::Export(args) => cmd_export(args, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn deck_root() -> Result<PathBuf, DeckError> {
    let start = match DECK_DIR_OVERRIDE.lock().ok().and_then(|dir| dir.clone()) {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    deck_io::discover_deck(&start)
}

fn load_deck_cwd() -> Result<Deck, DeckError> {
    deck_io::load_deck(&deck_root()?)
}

/// Take the deck lock, then load. Hold the returned lock until after saving.
fn load_deck_locked() -> Result<(Deck, DeckLock), Box<dyn std::error::Error>> {
    let root = deck_root()?;
    let lock = DeckLock::acquire_default(&root.join("deck"))?;
    let deck = deck_io::load_deck(&root)?;
    Ok((deck, lock))
}

fn require_active(deck: &Deck) -> Result<&str, DeckError> {
    deck.active.as_deref().ok_or(DeckError::NoActiveProject)
}

/// Run a deck.toml edit under the lock and write the result back.
fn edit_config(
    edit: impl FnOnce(&Path, &mut toml_edit::DocumentMut, &mut DeckConfig) -> Result<(), ProjectError>,
) -> Result<DeckConfig, Box<dyn std::error::Error>> {
    let deck_dir = deck_root()?.join("deck");
    let _lock = DeckLock::acquire_default(&deck_dir)?;
    let (mut config, mut doc) = config_io::read_config(&deck_dir)?;
    edit(&deck_dir, &mut doc, &mut config)?;
    config_io::write_config(&deck_dir, &doc)?;
    Ok(config)
}

fn print_created(id: &str, json: bool) -> CmdResult {
    if json {
        let out = CreatedJson { id: id.to_string() };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", id);
    }
    Ok(())
}

fn print_renamed(id: &str, name: &str, json: bool) -> CmdResult {
    if json {
        let out = RenamedJson {
            id: id.to_string(),
            name: name.to_string(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("renamed {}", id);
    }
    Ok(())
}

fn print_removed(ids: &[String], json: bool) -> CmdResult {
    if json {
        let out = RemovedJson {
            removed: ids.to_vec(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("removed {}", ids.join(", "));
    }
    Ok(())
}

fn print_added(container: &str, ids: &[String], json: bool) -> CmdResult {
    if json {
        let out = AddedJson {
            container: container.to_string(),
            added: ids.to_vec(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if ids.is_empty() {
        println!("nothing added to {}", container);
    } else {
        println!("added {} to {}", ids.join(", "), container);
    }
    Ok(())
}

fn print_project_change(change: ProjectChangeJson, json: bool) -> CmdResult {
    if json {
        println!("{}", serde_json::to_string_pretty(&change)?);
    } else {
        for line in format_project_change(&change) {
            println!("{}", line);
        }
    }
    Ok(())
}

/// Whether OVER names the dragged unit itself
fn is_self_drop(container_id: &str, leaf_id: &str, over: &str) -> bool {
    let over = decode_token(over);
    over.container_id == container_id && over.leaf_id.as_deref() == Some(leaf_id)
}

fn drag_kind(kind: MoveKind) -> DragKind {
    match kind {
        MoveKind::Leaf => DragKind::Leaf,
        MoveKind::Section => DragKind::Section,
        MoveKind::Subsection => DragKind::Subsection,
    }
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_show(json: bool) -> CmdResult {
    let deck = load_deck_cwd()?;

    if json {
        let out = ShowJson {
            project: deck.active.as_deref(),
            sections: &deck.collection.sections,
            selected: deck.selection.selected.iter().map(String::as_str).collect(),
            playground: &deck.playground,
            playground_selected: deck.staged.selected.iter().map(String::as_str).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let project = require_active(&deck)?;
    println!("== {} ({}) ==", project, deck.config.deck.name);
    let lines = format_outline(&deck.collection, &deck.selection);
    if lines.is_empty() {
        println!("(empty outline)");
    }
    for line in lines {
        println!("{}", line);
    }
    if !deck.playground.is_empty() {
        println!("-- playground --");
        for line in format_playground(&deck.playground, &deck.staged) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_check(json: bool) -> CmdResult {
    let deck = load_deck_cwd()?;
    let mut result = check::check_collection(&deck.collection, &deck.selection);
    check::check_playground(&deck.playground, &deck.collection, &mut result);
    let units_dir = deck.root.join(&deck.config.export.units_dir);
    check::check_unit_files(&deck.collection, &units_dir, &mut result);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for line in format_check(&result) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_search(args: SearchArgs, json: bool) -> CmdResult {
    let re = Regex::new(&args.pattern)?;
    let deck = load_deck_cwd()?;
    let hits = search::search_outline(&deck.collection, &re);

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
    } else {
        for line in format_search_hits(&hits) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_token(args: TokenCmd, json: bool) -> CmdResult {
    let token = match args.action {
        TokenAction::Encode(a) => {
            for id in std::iter::once(&a.container).chain(a.unit.as_ref()) {
                if !is_valid_id(id) {
                    return Err(OutlineError::InvalidId(id.clone()).into());
                }
            }
            let token = encode_token(&a.container, a.unit.as_deref());
            if !json {
                println!("{}", token);
                return Ok(());
            }
            token
        }
        TokenAction::Decode(a) => a.token,
    };

    let decoded = decode_token(&token);
    if json {
        let out = TokenJson { token, decoded };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("container: {}", decoded.container_id);
        if let Some(leaf) = decoded.leaf_id {
            println!("unit: {}", leaf);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write command handlers
// ---------------------------------------------------------------------------

fn cmd_section(args: SectionCmd, json: bool) -> CmdResult {
    let (mut deck, _lock) = load_deck_locked()?;
    require_active(&deck)?;

    match args.action {
        SectionAction::Add(a) => {
            let (next, id) = outline_ops::add_section(&deck.collection, &a.name);
            deck.collection = next;
            deck_io::save_deck(&deck)?;
            print_created(&id, json)?;
        }
        SectionAction::Rename(a) => {
            deck.collection = outline_ops::rename_section(&deck.collection, &a.id, &a.name)?;
            deck_io::save_deck(&deck)?;
            print_renamed(&a.id, &a.name, json)?;
        }
        SectionAction::Rm(a) => {
            deck.collection = outline_ops::remove_section(&deck.collection, &a.id)?;
            selection_ops::prune(&mut deck.selection, &deck.collection);
            deck_io::save_deck(&deck)?;
            print_removed(&[a.id], json)?;
        }
    }
    Ok(())
}

fn cmd_subsection(args: SubsectionCmd, json: bool) -> CmdResult {
    let (mut deck, _lock) = load_deck_locked()?;
    require_active(&deck)?;

    match args.action {
        SubsectionAction::Add(a) => {
            let (next, id) = outline_ops::add_subsection(&deck.collection, &a.section, &a.name)?;
            deck.collection = next;
            deck_io::save_deck(&deck)?;
            print_created(&id, json)?;
        }
        SubsectionAction::Rename(a) => {
            deck.collection = outline_ops::rename_subsection(&deck.collection, &a.id, &a.name)?;
            deck_io::save_deck(&deck)?;
            print_renamed(&a.id, &a.name, json)?;
        }
        SubsectionAction::Rm(a) => {
            deck.collection = outline_ops::remove_subsection(&deck.collection, &a.id)?;
            selection_ops::prune(&mut deck.selection, &deck.collection);
            deck_io::save_deck(&deck)?;
            print_removed(&[a.id], json)?;
        }
    }
    Ok(())
}

fn cmd_unit(args: UnitCmd, json: bool) -> CmdResult {
    let (mut deck, _lock) = load_deck_locked()?;
    require_active(&deck)?;

    match args.action {
        UnitAction::Add(a) => {
            let at = a.at.unwrap_or(usize::MAX);
            deck.collection = outline_ops::insert_leaves(&deck.collection, &a.subsection, &a.ids, at)?;
            // placing a staged unit takes it out of the playground
            let placed: HashSet<LeafId> = a.ids.iter().cloned().collect();
            deck.playground = playground_ops::unstage_units(&deck.playground, &placed);
            selection_ops::prune_to(&mut deck.staged, &deck.playground);
            deck_io::save_deck(&deck)?;
            print_added(&a.subsection, &a.ids, json)?;
        }
        UnitAction::Rm(a) => {
            if let Some(missing) = a.ids.iter().find(|id| !deck.collection.contains_leaf(id)) {
                return Err(OutlineError::LeafNotFound(missing.clone()).into());
            }
            let ids: HashSet<String> = a.ids.iter().cloned().collect();
            deck.collection = outline_ops::remove_leaves(&deck.collection, &ids);
            selection_ops::prune(&mut deck.selection, &deck.collection);
            deck_io::save_deck(&deck)?;
            print_removed(&a.ids, json)?;
        }
    }
    Ok(())
}

fn cmd_playground(args: PlaygroundCmd, json: bool) -> CmdResult {
    let action = args.action.unwrap_or(PlaygroundAction::Ls);
    if let PlaygroundAction::Ls = action {
        let deck = load_deck_cwd()?;
        require_active(&deck)?;
        if json {
            let out = PlaygroundJson {
                units: &deck.playground,
                selected: deck.staged.selected.iter().map(String::as_str).collect(),
                anchor_index: deck.staged.anchor_index,
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        } else if deck.playground.is_empty() {
            println!("(playground is empty)");
        } else {
            for line in format_playground(&deck.playground, &deck.staged) {
                println!("{}", line);
            }
        }
        return Ok(());
    }

    let (mut deck, _lock) = load_deck_locked()?;
    require_active(&deck)?;

    match action {
        PlaygroundAction::Add(a) => {
            let (next, added) =
                playground_ops::stage_units(&deck.playground, &deck.collection, &a.ids)?;
            deck.playground = next;
            deck_io::save_deck(&deck)?;
            print_added(PLAYGROUND_ID, &added, json)?;
        }
        PlaygroundAction::Rm(a) => {
            if let Some(missing) = a.ids.iter().find(|id| !deck.playground.contains(id)) {
                return Err(OutlineError::NotStaged(missing.clone()).into());
            }
            let ids: HashSet<LeafId> = a.ids.iter().cloned().collect();
            deck.playground = playground_ops::unstage_units(&deck.playground, &ids);
            selection_ops::prune_to(&mut deck.staged, &deck.playground);
            deck_io::save_deck(&deck)?;
            print_removed(&a.ids, json)?;
        }
        PlaygroundAction::Ls => {}
    }
    Ok(())
}

fn cmd_select(args: SelectArgs, json: bool) -> CmdResult {
    let (mut deck, _lock) = load_deck_locked()?;
    let project = require_active(&deck)?.to_string();

    let (ordered, selection) = if args.playground {
        (deck.playground.clone(), &mut deck.staged)
    } else {
        (deck.collection.flattened_leaf_ids(), &mut deck.selection)
    };
    selection_ops::prune_to(selection, &ordered);

    if args.clear {
        selection_ops::clear(selection);
    } else if let Some(id) = &args.id {
        let index = ordered.iter().position(|u| u == id).ok_or_else(|| {
            if args.playground {
                OutlineError::NotStaged(id.clone())
            } else {
                OutlineError::LeafNotFound(id.clone())
            }
        })?;
        *selection = selection_ops::toggle_selection(selection, id, index, args.extend, &ordered);
    }

    if args.playground {
        state::write_playground_selection(&deck.deck_dir, &project, selection)?;
    } else {
        state::write_selection(&deck.deck_dir, &project, selection)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&selection_to_json(selection))?);
    } else if selection.is_empty() {
        println!("(no selection)");
    } else {
        let ids: Vec<&str> = selection.selected.iter().map(String::as_str).collect();
        println!("selected: {}", ids.join(" "));
    }
    Ok(())
}

fn cmd_mv(args: MvArgs, json: bool) -> CmdResult {
    let (mut deck, _lock) = load_deck_locked()?;
    require_active(&deck)?;

    let kind = drag_kind(args.kind);
    let active = decode_token(&args.active);

    let result = match kind.container_kind() {
        None => {
            let primary = active.leaf_id.ok_or_else(|| {
                format!(
                    "unit drags need a SUBSECTION{}UNIT token, got '{}'",
                    TOKEN_SEPARATOR, args.active
                )
            })?;
            let target = DropTarget::from_token(&args.over);

            if active.container_id == PLAYGROUND_ID {
                let session = DragSession::from_playground(&deck.playground, &deck.staged, &primary);
                let placement = playground_ops::apply_staged_drop(
                    &deck.collection,
                    &deck.playground,
                    &deck.staged,
                    &session,
                    &target,
                );
                let applied = placement.is_applied();
                let status = placement.status;
                if applied {
                    deck.collection = placement.collection;
                    deck.playground = placement.playground;
                    deck.staged = placement.selection;
                    selection_ops::clear(&mut deck.selection);
                    deck_io::save_deck(&deck)?;
                }
                MoveJson::from_status(kind, session.dragged_ids, status)
            } else if is_self_drop(&active.container_id, &primary, &args.over) {
                // dropped onto itself; the group stays where it is
                let status = RelocationStatus::Unchanged(NoOpReason::SelfDrop);
                tracing::debug!(token = %args.active, "drop onto the dragged unit ignored");
                MoveJson::from_status(kind, vec![primary], status)
            } else {
                let session = DragSession::from_selection(&deck.collection, &deck.selection, &primary);
                let relocation = relocate::apply_leaf_relocation(
                    &deck.collection,
                    &deck.selection,
                    &session,
                    &target,
                );
                let applied = relocation.is_applied();
                let status = relocation.status;
                if applied {
                    deck.collection = relocation.collection;
                    deck.selection = relocation.selection;
                    deck_io::save_deck(&deck)?;
                }
                MoveJson::from_status(kind, session.dragged_ids, status)
            }
        }
        Some(container_kind) => {
            let over = decode_token(&args.over);
            let next = container_ops::apply_container_reorder(
                &deck.collection,
                &active.container_id,
                &over.container_id,
                container_kind,
            );
            let moved = next != deck.collection;
            if moved {
                deck.collection = next;
                deck_io::save_deck(&deck)?;
            }
            MoveJson {
                kind,
                dragged: vec![active.container_id],
                moved,
                reason: None,
            }
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", format_move(&result));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

fn cmd_project(args: ProjectCmd, json: bool) -> CmdResult {
    match args.action.unwrap_or(ProjectAction::List) {
        ProjectAction::List => cmd_project_list(json),
        ProjectAction::New(a) => {
            let config = edit_config(|deck_dir, doc, config| {
                project_ops::new_project(deck_dir, doc, config, &a.name)
            })?;
            let change = ProjectChangeJson {
                change: ProjectChange::Created,
                project: a.name,
                previous: None,
                active: config.deck.active,
            };
            print_project_change(change, json)
        }
        ProjectAction::Rename(a) => {
            let config = edit_config(|deck_dir, doc, config| {
                project_ops::rename_project(deck_dir, doc, config, &a.old, &a.new)?;
                state::rename_selection(deck_dir, &a.old, &a.new).map_err(DeckError::IoError)?;
                Ok(())
            })?;
            let change = ProjectChangeJson {
                change: ProjectChange::Renamed,
                project: a.new,
                previous: Some(a.old),
                active: config.deck.active,
            };
            print_project_change(change, json)
        }
        ProjectAction::Rm(a) => {
            let config = edit_config(|deck_dir, doc, config| {
                project_ops::delete_project(deck_dir, doc, config, &a.name)?;
                state::remove_selection(deck_dir, &a.name).map_err(DeckError::IoError)?;
                Ok(())
            })?;
            let change = ProjectChangeJson {
                change: ProjectChange::Deleted,
                project: a.name,
                previous: None,
                active: config.deck.active,
            };
            print_project_change(change, json)
        }
        ProjectAction::Switch(a) => {
            let config =
                edit_config(|_, doc, config| project_ops::switch_project(doc, config, &a.name))?;
            let change = ProjectChangeJson {
                change: ProjectChange::Switched,
                project: a.name,
                previous: None,
                active: config.deck.active,
            };
            print_project_change(change, json)
        }
    }
}

fn cmd_project_list(json: bool) -> CmdResult {
    let deck_dir = deck_root()?.join("deck");
    let (config, _) = config_io::read_config(&deck_dir)?;

    let mut projects = Vec::new();
    for p in &config.projects {
        let file = deck_io::load_project_file(&deck_dir, &p.file)?;
        let modified = fs::metadata(deck_dir.join(&p.file))
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Local>::from);
        projects.push(ProjectJson {
            name: p.name.clone(),
            file: p.file.clone(),
            active: config.deck.active.as_deref() == Some(p.name.as_str()),
            units: file.outline.count_leaves(),
            staged: file.playground.len(),
            modified,
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
    } else if projects.is_empty() {
        println!("no projects (create one with `nd project new <NAME>`)");
    } else {
        for p in &projects {
            println!("{}", format_project_line(p));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

fn cmd_export(args: ExportArgs, json: bool) -> CmdResult {
    let deck = load_deck_cwd()?;
    let project = require_active(&deck)?;
    let settings = &deck.config.export;

    let units_dir = deck.root.join(&settings.units_dir);
    let header = settings.header.as_ref().map(|h| deck.root.join(h));
    let output = match args.output {
        Some(path) => PathBuf::from(path),
        None => export::next_export_path(&deck.root.join(&settings.output_dir), project),
    };

    let path = export::export_document(&deck.collection, &units_dir, header.as_deref(), &output)?;

    if json {
        let out = ExportJson {
            path: path.display().to_string(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("exported {}", path.display());
    }
    Ok(())
}
