//! Pipeline tests over real directory trees.
//!
//! These drive [`Engine`] end to end against temp dirs: traversal, rewriting,
//! write-back and the no-change paths.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use returnfix_core::config::FixConfig;
use returnfix_core::engine::Engine;
use returnfix_core::source::FileState;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, text: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, text).unwrap();
    path
}

fn engine(root: &Path) -> Engine {
    Engine::new(FixConfig::default().with_root(root)).unwrap()
}

fn backdate(path: &Path) -> SystemTime {
    let old = SystemTime::UNIX_EPOCH + Duration::from_secs(1_500_000_000);
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(old)
        .unwrap();
    old
}

const CONTROLLER: &str = r#"import { Request, Response, NextFunction } from 'express';
import * as service from './products.service';

// Handlers must stop after res.json(...) or next(error).
export class ProductsController {
  async list(req: Request, res: Response, next: NextFunction) {
    try {
      const items = await service.list();
      res.json(items);
    } catch (error) { next(error); }
  }

  async create(req: Request, res: Response, next: NextFunction) {
    try {
      if (!req.body.name) {
        res
          .status(400)
          .json({ error: "name is required; see res.json(docs)" });
      }
      const created = await service.create(req.body);
      res.status(201).json(created);
    } catch (err) {
      next(err);
    }
  }

  async remove(req: Request, res: Response, next: NextFunction) {
    const ok = await service.remove(req.params.id);
    const body = ok ? { removed: true } : { removed: false };
    return res.json(body);
  }
}
"#;

const CONTROLLER_FIXED: &str = r#"import { Request, Response, NextFunction } from 'express';
import * as service from './products.service';

// Handlers must stop after res.json(...) or next(error).
export class ProductsController {
  async list(req: Request, res: Response, next: NextFunction) {
    try {
      const items = await service.list();
      return res.json(items);
    } catch (error) { return next(error); }
  }

  async create(req: Request, res: Response, next: NextFunction) {
    try {
      if (!req.body.name) {
        return res
          .status(400)
          .json({ error: "name is required; see res.json(docs)" });
      }
      const created = await service.create(req.body);
      return res.status(201).json(created);
    } catch (err) {
      return next(err);
    }
  }

  async remove(req: Request, res: Response, next: NextFunction) {
    const ok = await service.remove(req.params.id);
    const body = ok ? { removed: true } : { removed: false };
    return res.json(body);
  }
}
"#;

// ============================================================================
// Rewriting
// ============================================================================

#[test]
fn realistic_controller_is_fixed_exactly() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "products/products.controller.ts", CONTROLLER);

    let report = engine(dir.path()).run().unwrap();
    assert_eq!(report.fixed_count(), 1);
    assert_eq!(report.fixed[0].insertions.len(), 5);
    assert_eq!(fs::read_to_string(&path).unwrap(), CONTROLLER_FIXED);
}

#[test]
fn second_pass_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "products/products.controller.ts", CONTROLLER);
    let engine = engine(dir.path());

    engine.run().unwrap();
    let mtime = backdate(&path);
    let report = engine.run().unwrap();

    assert_eq!(report.files_scanned, 1);
    assert_eq!(report.fixed_count(), 0);
    assert_eq!(fs::read_to_string(&path).unwrap(), CONTROLLER_FIXED);
    assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), mtime);
}

#[test]
fn fix_text_reaches_unchanged_on_fixed_input() {
    let engine = engine(Path::new("unused"));
    let file = engine.fix_text("x.controller.ts", CONTROLLER_FIXED).unwrap();
    assert_eq!(file.state(), FileState::Unchanged);
    assert!(file.matches().is_empty());
}

const CHAINED: &str = r#"export const list = (req: Request, res: Response, next: NextFunction) => {
  service
    .list()
    .then((items) =>
      res.status(200).json({ items }),
    )
    .catch(next);
};

export const show = async (req: Request, res: Response) => {
  const item = await service.find(req.params.id);
  if (!item) {
    return (
      res.status(404).json({ error: 'not found' })
    );
  }
  send(
    res.json(item)
  );
  res.json(item);
};
"#;

#[test]
fn continuation_lines_are_not_rewritten() {
    let engine = engine(Path::new("unused"));
    let file = engine.fix_text("x.controller.ts", CHAINED).unwrap();
    assert_eq!(file.matches().len(), 1);
    assert_eq!(
        file.rewritten().unwrap(),
        CHAINED.replacen("  res.json(item);\n};", "  return res.json(item);\n};", 1)
    );

    let again = engine
        .fix_text("x.controller.ts", file.rewritten().unwrap())
        .unwrap();
    assert_eq!(again.state(), FileState::Unchanged);
}

// ============================================================================
// Traversal and write-back
// ============================================================================

#[test]
fn visits_exactly_the_matching_files() {
    let dir = TempDir::new().unwrap();
    for name in ["a", "b", "c", "d"] {
        write(
            dir.path(),
            &format!("{name}/{name}.controller.ts"),
            "export {};\n",
        );
        write(dir.path(), &format!("{name}/{name}.service.ts"), "next();\n");
    }
    write(dir.path(), "node_modules/x/x.controller.ts", "next();\n");

    let engine = engine(dir.path());
    assert_eq!(engine.candidates().count(), 4);
    let report = engine.run().unwrap();
    assert_eq!(report.files_scanned, 4);
    assert_eq!(report.fixed_count(), 0);
}

#[test]
fn unchanged_files_keep_their_mtime() {
    let dir = TempDir::new().unwrap();
    let clean = write(
        dir.path(),
        "clean.controller.ts",
        "export function ok(req, res) {\n  return res.json({});\n}\n",
    );
    let dirty = write(
        dir.path(),
        "dirty.controller.ts",
        "export function ko(req, res) {\n  res.json({});\n}\n",
    );
    let clean_mtime = backdate(&clean);
    let dirty_mtime = backdate(&dirty);

    let report = engine(dir.path()).run().unwrap();
    assert_eq!(report.fixed_count(), 1);
    assert_eq!(report.fixed[0].path, dirty);
    assert_eq!(fs::metadata(&clean).unwrap().modified().unwrap(), clean_mtime);
    assert_ne!(fs::metadata(&dirty).unwrap().modified().unwrap(), dirty_mtime);
}

#[test]
fn dry_run_reports_but_does_not_write() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "p.controller.ts", CONTROLLER);
    let config = FixConfig::default().with_root(dir.path()).with_dry_run(true);

    let report = Engine::new(config).unwrap().run().unwrap();
    assert!(report.dry_run);
    assert_eq!(report.fixed_count(), 1);
    assert_eq!(report.edits().len(), 5);
    assert_eq!(fs::read_to_string(&path).unwrap(), CONTROLLER);
}
