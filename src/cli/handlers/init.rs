use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::{config_io, deck_io};
use crate::ops::project_ops;

/// "lecture-notes_2024" -> "Lecture Notes 2024"
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + chars.as_str()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn cmd_init(args: InitArgs, dir: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let root = match dir {
        Some(d) => d.to_path_buf(),
        None => std::env::current_dir()?,
    };

    if let Some(project) = &args.project
        && !project_ops::is_valid_project_name(project)
    {
        return Err(project_ops::ProjectError::InvalidName(project.clone()).into());
    }

    if let Some(parent) = root.parent()
        && let Ok(parent_root) = deck_io::discover_deck(parent)
    {
        eprintln!(
            "Note: parent deck found at {}/",
            parent_root.join("deck").display()
        );
        eprintln!("Creating new deck in ./deck/");
    }

    let name = args.name.unwrap_or_else(|| {
        root.file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Untitled".to_string())
    });

    let deck_dir = deck_io::init_deck(&root, &name, args.force)?;
    println!("Initialized deck: {}", name);

    if let Some(project) = &args.project {
        let (mut config, mut doc) = config_io::read_config(&deck_dir)?;
        project_ops::new_project(&deck_dir, &mut doc, &mut config, project)?;
        config_io::write_config(&deck_dir, &doc)?;
        println!("  project: {} (active)", project);
    }

    Ok(())
}
