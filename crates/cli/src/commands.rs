//! Subcommand handlers. Each loads what it needs, runs one library
//! command, saves the model on success and returns the text and exit
//! status to report.

use std::path::Path;

use anyhow::{Context, Result};
use headroom_clearance::{run as run_clearance, RunMode};
use headroom_model::{ensure_schema, AttributeSchema, Category, CommandOutcome, Document, ElementId, MutationScope};
use headroom_propagation::{
    apply_changes, preview_door_number, sync_door_updater, update_all_doors, update_selected_doors, ChangeSet,
    DoorNumberOptions, OptionsStore, UpdaterContext, UpdaterRegistry,
};
use tracing::info;

use crate::config::HeadroomConfig;

/// What a subcommand prints and how the process exits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub code: i32,
    pub message: String,
}

impl Report {
    fn from_outcome<T>(outcome: &CommandOutcome<T>, success: impl FnOnce(&T) -> String) -> Self {
        let message = match outcome {
            CommandOutcome::Succeeded(value) => success(value),
            CommandOutcome::Failed(m) | CommandOutcome::Cancelled(m) => m.clone(),
        };
        Self {
            code: outcome.exit_code(),
            message,
        }
    }
}

fn load_model(path: &Path) -> Result<Document> {
    Document::load(path).with_context(|| format!("Failed to load model {}", path.display()))
}

fn save_model(doc: &Document, path: &Path) -> Result<()> {
    doc.save(path)
        .with_context(|| format!("Failed to save model {}", path.display()))
}

// ============================================================================
// clearance / schema
// ============================================================================

pub fn clearance(model: &Path, config: Option<&Path>, dry_run: bool) -> Result<Report> {
    let config = HeadroomConfig::resolve(config)?;
    let mut doc = load_model(model)?;
    let mode = if dry_run { RunMode::DryRun } else { RunMode::Commit };

    let outcome = run_clearance(&mut doc, &config.clearance, mode);
    if outcome.is_succeeded() && !dry_run {
        save_model(&doc, model)?;
    }
    Ok(Report::from_outcome(&outcome, |r| r.message()))
}

pub fn schema(model: &Path, category: Category, schema: Option<&Path>) -> Result<Report> {
    if !matches!(category, Category::Room | Category::Door) {
        return Ok(Report {
            code: 1,
            message: format!("No attributes are provisioned for {} elements; use rooms or doors.", category),
        });
    }
    let schema = match schema {
        Some(path) => AttributeSchema::load(path)
            .with_context(|| format!("Failed to load schema {}", path.display()))?,
        None => AttributeSchema::builtin(),
    };
    let mut doc = load_model(model)?;

    let report = {
        let mut scope = MutationScope::open(&mut doc, format!("Provision {} attributes", category));
        let report = ensure_schema(&mut scope, &schema, category)?;
        scope.commit();
        report
    };
    if !report.added.is_empty() {
        save_model(&doc, model)?;
    }
    Ok(Report {
        code: 0,
        message: report.message(),
    })
}

// ============================================================================
// doors
// ============================================================================

pub fn doors_update(model: &Path, selected: &[ElementId], store: &OptionsStore) -> Result<Report> {
    let options = store.load()?;
    let mut doc = load_model(model)?;
    let outcome = if selected.is_empty() {
        update_all_doors(&mut doc, &options)
    } else {
        update_selected_doors(&mut doc, selected, &options)
    };
    if outcome.is_succeeded() {
        save_model(&doc, model)?;
    }
    Ok(Report::from_outcome(&outcome, |n| format!("Updated {} door(s).", n)))
}

/// Changes to stored door options; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct OptionsChange {
    pub extra_attribute: Option<String>,
    pub separator: Option<String>,
    pub number_attribute: Option<String>,
    pub auto_update: Option<bool>,
}

impl OptionsChange {
    fn apply(self, options: &mut DoorNumberOptions) {
        if let Some(v) = self.extra_attribute {
            options.extra_attribute = v;
        }
        if let Some(v) = self.separator {
            options.separator = v;
        }
        if let Some(v) = self.number_attribute {
            options.number_attribute = v;
        }
        if let Some(v) = self.auto_update {
            options.auto_update = v;
        }
    }
}

/// Store new options; with a model, renumber all its doors right away
pub fn doors_configure(change: OptionsChange, model: Option<&Path>, store: &OptionsStore) -> Result<Report> {
    let mut options = store.load()?;
    change.apply(&mut options);
    store.save(&options)?;

    let mut message = format!(
        "Door options saved to {}\n  extra attribute: {}\n  separator: {:?}\n  number attribute: {}\n  auto update: {}",
        store.path().display(),
        if options.extra_attribute.is_empty() { "(none)" } else { &options.extra_attribute },
        options.separator,
        options.number_attribute,
        options.auto_update,
    );

    let Some(model) = model else {
        return Ok(Report { code: 0, message });
    };
    let mut doc = load_model(model)?;
    let outcome = update_all_doors(&mut doc, &options);
    if outcome.is_succeeded() {
        save_model(&doc, model)?;
    }
    let update = Report::from_outcome(&outcome, |n| format!("Updated {} door(s).", n));
    message.push('\n');
    message.push_str(&update.message);
    Ok(Report {
        code: update.code,
        message,
    })
}

pub fn doors_preview(model: &Path, store: &OptionsStore) -> Result<Report> {
    let options = store.load()?;
    let doc = load_model(model)?;
    let message = preview_door_number(&doc, &options).unwrap_or_else(|| "(no door found)".to_string());
    Ok(Report { code: 0, message })
}

// ============================================================================
// updater / apply
// ============================================================================

pub fn updater_toggle(store: &OptionsStore) -> Result<Report> {
    let mut options = store.load()?;
    let mut ctx = UpdaterContext::new(options.auto_update);
    options.auto_update = ctx.toggle();
    store.save(&options)?;
    let state = if options.auto_update { "enabled" } else { "paused" };
    Ok(Report {
        code: 0,
        message: format!("Automatic door updates are now {}.", state),
    })
}

pub fn apply(model: &Path, changes: &Path, store: &OptionsStore) -> Result<Report> {
    let options = store.load()?;
    let changes = ChangeSet::load(changes)?;
    let mut doc = load_model(model)?;

    let ctx = UpdaterContext::new(options.auto_update);
    let mut registry = UpdaterRegistry::new();
    let registered = sync_door_updater(&mut registry, &ctx, &options)?;
    info!(door_updater = registered, "Updater bus ready");

    let outcome = apply_changes(&mut doc, &changes, &registry, &ctx);
    if outcome.is_succeeded() {
        save_model(&doc, model)?;
    }
    Ok(Report::from_outcome(&outcome, |r| r.message()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = r#"{
        "name": "CLI",
        "levels": [{ "id": 1, "name": "EG", "elevation": 0.0 }],
        "spaces": [{
            "id": 10, "name": "Office", "number": "0.01", "level": 1,
            "unbounded_height": 3.0, "location": [2.0, 2.0, 0.0],
            "attributes": { "KAI_GEO_Lichte_Höhe": { "kind": "number" } }
        }],
        "surfaces": [{
            "id": 20, "category": "ceiling", "bottom": 2.6, "top": 2.8,
            "footprint": [[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]]
        }],
        "doors": [{ "id": 40, "name": "T1", "to_room": 10 }],
        "walls": [],
        "views": [{ "id": 90, "name": "{3D}", "kind": "three_d" }],
        "active_view": 90
    }"#;

    fn setup() -> (tempfile::TempDir, std::path::PathBuf, OptionsStore) {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("model.json");
        std::fs::write(&model, MODEL).unwrap();
        let store = OptionsStore::new(dir.path().join("options.toml"));
        (dir, model, store)
    }

    #[test]
    fn test_clearance_writes_and_saves() {
        let (dir, model, _) = setup();
        let config = dir.path().join("headroom.toml");
        std::fs::write(&config, "[clearance]\n").unwrap();

        let report = clearance(&model, Some(&config), true).unwrap();
        assert_eq!(report.code, 0);
        let doc = Document::load(&model).unwrap();
        assert_eq!(doc.space(ElementId(10)).unwrap().attributes.number("KAI_GEO_Lichte_Höhe"), None);

        let report = clearance(&model, Some(&config), false).unwrap();
        assert_eq!(report.code, 0);
        assert!(report.message.starts_with("Clearance calculated for 1 of 1"));
        let doc = Document::load(&model).unwrap();
        let value = doc.space(ElementId(10)).unwrap().attributes.number("KAI_GEO_Lichte_Höhe").unwrap();
        assert!((value - 2.6).abs() < 1e-9);
    }

    #[test]
    fn test_schema_then_doors_update() {
        let (_dir, model, store) = setup();
        let report = schema(&model, Category::Door, None).unwrap();
        assert!(report.message.starts_with("Added door attribute(s):"));
        let report = schema(&model, Category::Door, None).unwrap();
        assert_eq!(report.message, "All required door attributes are already present.");
        assert_eq!(schema(&model, Category::Wall, None).unwrap().code, 1);

        let report = doors_update(&model, &[], &store).unwrap();
        assert_eq!(report, Report { code: 0, message: "Updated 1 door(s).".into() });
        let doc = Document::load(&model).unwrap();
        assert_eq!(doc.door(ElementId(40)).unwrap().attributes.text("InRaum_Name"), Some("Office"));

        let report = doors_update(&model, &[ElementId(10)], &store).unwrap();
        assert_eq!(report.code, 2);
    }

    #[test]
    fn test_configure_toggle_and_preview() {
        let (_dir, model, store) = setup();
        let change = OptionsChange {
            separator: Some("/".into()),
            ..Default::default()
        };
        doors_configure(change, None, &store).unwrap();
        assert_eq!(store.load().unwrap().separator, "/");

        let report = updater_toggle(&store).unwrap();
        assert_eq!(report.message, "Automatic door updates are now paused.");
        assert!(!store.load().unwrap().auto_update);

        assert_eq!(doors_preview(&model, &store).unwrap().message, "0.01");
    }

    #[test]
    fn test_apply_runs_door_updater() {
        let (dir, model, store) = setup();
        schema(&model, Category::Door, None).unwrap();
        let changes = dir.path().join("changes.json");
        std::fs::write(
            &changes,
            r#"[{ "op": "set_door_rooms", "door": 40, "from_room": null, "to_room": 10 }]"#,
        )
        .unwrap();
        let report = apply(&model, &changes, &store).unwrap();
        assert_eq!(report.code, 0);
        let doc = Document::load(&model).unwrap();
        assert_eq!(doc.door(ElementId(40)).unwrap().attributes.text("KAI_TUE_Nummer"), Some("0.01"));
    }
}
