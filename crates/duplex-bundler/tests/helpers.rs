//! Shared fixtures for pipeline integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use duplex_profile::{
    FallbackMap, ModuleFallback, ReservedSymbols, TargetProfile,
};

pub fn write_file(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Shared source in the shape of the real project: an entry point whose
/// handlers are exported and bound onto the global scope, one helper that
/// leans on a platform module, and one plain helper.
pub fn write_shared_source(root: &Path) {
    write_file(
        root,
        "src/main.ts",
        r#"import { buildRoute } from "./paths";
import { handleRequest } from "./handler";

/* @preserve duplex host entry points */

export function doGet(request: unknown): string {
  return handleRequest(buildRoute("api", "status"), request);
}

export function doPost(request: unknown): string {
  return handleRequest(buildRoute("api", "submit"), request);
}

globalThis.doGet = doGet;
globalThis.doPost = doPost;
"#,
    );
    write_file(
        root,
        "src/paths.ts",
        r#"import { join } from "path";

export function buildRoute(...parts: string[]): string {
  return "/" + join(...parts);
}
"#,
    );
    write_file(
        root,
        "src/handler.ts",
        r#"export function handleRequest(route: string, request: unknown): string {
  return JSON.stringify({ route, handled: request !== undefined });
}
"#,
    );
    write_file(
        root,
        "polyfills/path.ts",
        r#"export function join(...parts: string[]): string {
  return parts.filter((part) => part.length > 0).join("/");
}
"#,
    );
}

/// Shared source with no platform module dependency, as the host path
/// prescribes.
pub fn write_host_only_source(root: &Path) {
    write_file(
        root,
        "src/main.ts",
        r#"import { handleRequest } from "./handler";

/* @preserve duplex host entry points */

export function doGet(request: unknown): string {
  return handleRequest("/api/status", request);
}

globalThis.doGet = doGet;
"#,
    );
    write_file(
        root,
        "src/handler.ts",
        r#"export function handleRequest(route: string, request: unknown): string {
  return JSON.stringify({ route, handled: request !== undefined });
}
"#,
    );
}

pub fn browser_profile() -> TargetProfile {
    TargetProfile::browser("src/main.ts", "dist/browser", "app.min.js", "MyPackage")
        .with_fallbacks(FallbackMap::empty().with(
            "path",
            ModuleFallback::Polyfill("polyfills/path.ts".into()),
        ))
}

pub fn host_profile() -> TargetProfile {
    TargetProfile::host_script(
        "src/main.ts",
        "dist/host",
        "main.gs",
        ReservedSymbols::new(["doGet"]),
    )
}
