// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Project initialization command for creating new viewkit projects.

use console::style;
use include_dir::{include_dir, Dir, DirEntry};
use std::fs;
use std::path::{Path, PathBuf};

static DEFAULT_TEMPLATE: Dir = include_dir!("$CARGO_MANIFEST_DIR/templates/default");

/// Initializes a new viewkit project.
///
/// `None` or `"."` initializes the current directory. Existing files are
/// left alone.
pub fn run(name: Option<String>) -> anyhow::Result<()> {
    let is_current_dir = matches!(name.as_deref(), Some(".") | None);
    let (project_dir, project_name) = resolve_project_path(name)?;

    if project_dir.exists() {
        tracing::info!(
            "Initializing viewkit project in existing directory: {}",
            project_name
        );
    } else {
        fs::create_dir_all(&project_dir)?;
        tracing::info!("Created project directory: {}", project_name);
    }

    let written = extract_template(&DEFAULT_TEMPLATE, &project_dir, &project_name)?;
    print_success(&project_name, written, is_current_dir);

    Ok(())
}

fn resolve_project_path(name: Option<String>) -> anyhow::Result<(PathBuf, String)> {
    match name.as_deref() {
        Some(".") | None => {
            let current_dir = std::env::current_dir()?;
            let dir_name = current_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "my-viewkit-site".to_string());
            Ok((current_dir, dir_name))
        }
        Some(name) => {
            let project_path = Path::new(name).to_path_buf();
            let dir_name = project_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| name.to_string());
            Ok((project_path, dir_name))
        }
    }
}

/// Writes the template into `target`, returning how many files were created.
fn extract_template(template: &Dir, target: &Path, project_name: &str) -> anyhow::Result<usize> {
    let mut written = 0;
    for entry in template.entries() {
        written += extract_entry(entry, target, project_name)?;
    }
    Ok(written)
}

fn extract_entry(entry: &DirEntry, target: &Path, project_name: &str) -> anyhow::Result<usize> {
    match entry {
        DirEntry::Dir(dir) => {
            fs::create_dir_all(target.join(dir.path()))?;
            let mut written = 0;
            for child in dir.entries() {
                written += extract_entry(child, target, project_name)?;
            }
            Ok(written)
        }
        DirEntry::File(file) => {
            let file_path = file.path();
            let file_name = file_path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| anyhow::anyhow!("Invalid file name: {:?}", file_path))?;

            // Handle special file names
            let target_name: &str = match file_name {
                "gitignore" => ".gitignore",
                name if name.ends_with(".tmpl") => &name[..name.len() - 5],
                name => name,
            };

            let target_path = match file_path.parent() {
                Some(parent) => target.join(parent).join(target_name),
                None => target.join(target_name),
            };

            if target_path.exists() {
                tracing::debug!("Keeping existing {}", target_path.display());
                return Ok(0);
            }
            if let Some(parent) = target_path.parent() {
                fs::create_dir_all(parent)?;
            }

            let content = file
                .contents_utf8()
                .ok_or_else(|| anyhow::anyhow!("Non-UTF8 file: {:?}", file_path))?;

            // Substitute project name in .tmpl files
            let content = if file_name.ends_with(".tmpl") {
                content.replace("{{project_name}}", project_name)
            } else {
                content.to_string()
            };

            fs::write(&target_path, content)?;
            Ok(1)
        }
    }
}

fn print_success(project_name: &str, written: usize, is_current_dir: bool) {
    println!(
        "{} Created viewkit project: {} {}",
        style("✓").green(),
        style(project_name).bold(),
        style(format!("({} files)", written)).dim()
    );
    println!();
    println!("Next steps:");
    if !is_current_dir {
        println!("  cd {}", project_name);
    }
    println!("  viewkit render index");
}
