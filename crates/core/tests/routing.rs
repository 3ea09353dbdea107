mod common;

use common::{CountingFileSystem, MaskedFileSystem, make_dir, write_file};
use modroute_api::{ExtensionKey, FileSystem};
use modroute_core::cache::{FileCache, MemoryCache};
use modroute_core::{Logger, ModuleResolver, OsFileSystem, RouteResolver};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

fn app_fixture(root: &Path) {
    for file in [
        "index.php",
        "app1.php",
        "foo/bar.json.php",
        "foo/bar.php",
        "foo/boo.json.php",
        "foo/readme.txt",
    ] {
        write_file(root, file, "<?php");
    }
}

fn router_with(fs: Arc<dyn FileSystem>) -> RouteResolver {
    RouteResolver::new("router", ".php", "index", fs, Logger::silent())
        .with_cache(Arc::new(MemoryCache::new()))
}

fn setup() -> (TempDir, PathBuf, RouteResolver) {
    let temp = TempDir::new().unwrap();
    let root = make_dir(temp.path(), "app");
    app_fixture(&root);
    let mut router = router_with(Arc::new(OsFileSystem));
    router.add_to_search_path("app", &root, 1).unwrap();
    (temp, root, router)
}

#[test]
fn test_extension_negotiation() {
    let (_temp, root, mut router) = setup();

    let plain = router.resolve("/foo/bar", None).unwrap();
    assert_eq!(plain.path, root.join("foo/bar.php"));
    assert_eq!(plain.ext, Some(ExtensionKey::Default));
    assert_eq!(plain.route, "/foo/bar");
    assert_eq!(plain.depth, 2);
    assert_eq!(plain.module, "app");

    let json = router.resolve("/foo/bar", Some(".json")).unwrap();
    assert_eq!(json.path, root.join("foo/bar.json.php"));
    assert_eq!(json.ext, Some(ExtensionKey::from_extension(".json")));

    assert_eq!(router.resolve("/foo/boo", Some(".xml")), None);

    let only = router.resolve("/foo/boo", None).unwrap();
    assert_eq!(only.path, root.join("foo/boo.json.php"));
    assert_eq!(only.ext, None);

    let nested = router.resolve("/foo/bar/baz", None).unwrap();
    assert_eq!(nested.path, root.join("foo/bar.php"));
    assert_eq!(nested.remainder, vec!["baz"]);
}

#[test]
fn test_extension_detected_from_request() {
    let (_temp, root, mut router) = setup();

    let json = router.resolve("/foo/bar.json", None).unwrap();
    assert_eq!(json.path, root.join("foo/bar.json.php"));
    assert!(json.remainder.is_empty());

    // Hint without a dot is normalized
    let hinted = router.resolve("/foo/bar", Some("json")).unwrap();
    assert_eq!(hinted.path, root.join("foo/bar.json.php"));
}

#[test]
fn test_root_request_uses_index() {
    let (_temp, root, mut router) = setup();
    let found = router.resolve("/", None).unwrap();
    assert_eq!(found.path, root.join("index.php"));
    assert_eq!(found.route, "/");
    assert_eq!(found.depth, 0);
}

#[test]
fn test_deleted_file_falls_back_to_index() {
    let (_temp, root, mut router) = setup();
    assert_eq!(
        router.resolve("/app1", None).unwrap().path,
        root.join("app1.php")
    );

    std::fs::remove_file(root.join("app1.php")).unwrap();

    let found = router.resolve("/app1", None).unwrap();
    assert_eq!(found.path, root.join("index.php"));
    assert_eq!(found.remainder, vec!["app1"]);
}

#[test]
fn test_authoritative_router_does_not_retry() {
    let (_temp, root, mut router) = setup();
    router.set_authoritative(true);
    router.resolve("/app1", None).unwrap();
    let scans = router.stats().scans;

    std::fs::remove_file(root.join("app1.php")).unwrap();

    let found = router.resolve("/app1", None).unwrap();
    assert_eq!(found.path, root.join("app1.php"));
    assert_eq!(router.stats().scans, scans);
}

#[test]
fn test_higher_precedence_module_shadows() {
    let temp = TempDir::new().unwrap();
    let core = make_dir(temp.path(), "core");
    let site = make_dir(temp.path(), "site");
    write_file(&core, "page.php", "core");
    write_file(&core, "contact.php", "core");
    write_file(&site, "page.php", "site");

    let mut router = router_with(Arc::new(OsFileSystem));
    router.add_to_search_path("core", &core, 10).unwrap();
    router.add_to_search_path("site", &site, 1).unwrap();

    assert_eq!(router.resolve("/page", None).unwrap().module, "site");
    assert_eq!(router.resolve("/contact", None).unwrap().module, "core");

    router.set_precedence("core", 0).unwrap();
    assert_eq!(router.resolve("/page", None).unwrap().module, "core");
}

#[test]
fn test_routes_are_built_once() {
    let temp = TempDir::new().unwrap();
    let root = make_dir(temp.path(), "app");
    app_fixture(&root);

    let fs = Arc::new(CountingFileSystem::new());
    let mut router = router_with(fs.clone());
    router.add_to_search_path("app", &root, 1).unwrap();

    let first = router.resolve("/foo/bar", None);
    let listings = fs.listings();
    let second = router.resolve("/foo/bar", None);

    assert_eq!(first, second);
    assert_eq!(fs.listings(), listings);
    assert_eq!(router.stats().scans, 1);
    assert_eq!(router.stats().hits, 1);
}

#[test]
fn test_new_files_need_cache_clear() {
    let (_temp, root, mut router) = setup();
    let before = router.resolve("/fresh", None).unwrap();
    assert_eq!(before.path, root.join("index.php"));

    write_file(&root, "fresh.php", "<?php");
    assert_eq!(
        router.resolve("/fresh", None).unwrap().path,
        root.join("index.php")
    );

    router.clear_cache();
    assert_eq!(
        router.resolve("/fresh", None).unwrap().path,
        root.join("fresh.php")
    );
}

#[test]
fn test_routes_load_from_file_cache() {
    let temp = TempDir::new().unwrap();
    let root = make_dir(temp.path(), "app");
    app_fixture(&root);
    let cache_dir = temp.path().join("cache");

    {
        let cache = FileCache::new(cache_dir.clone(), Logger::silent()).unwrap();
        let mut router = RouteResolver::new(
            "router",
            ".php",
            "index",
            Arc::new(OsFileSystem),
            Logger::silent(),
        )
        .with_cache(Arc::new(cache));
        router.add_to_search_path("app", &root, 1).unwrap();
        router.resolve("/foo/bar", None).unwrap();
    }

    let fs = Arc::new(CountingFileSystem::new());
    let cache = FileCache::new(cache_dir, Logger::silent()).unwrap();
    let mut router = RouteResolver::new("router", ".php", "index", fs.clone(), Logger::silent())
        .with_cache(Arc::new(cache));
    router.add_to_search_path("app", &root, 1).unwrap();

    let found = router.resolve("/foo/bar", Some(".json")).unwrap();
    assert_eq!(found.path, root.join("foo/bar.json.php"));
    assert_eq!(fs.listings(), 0);
    assert_eq!(router.stats().scans, 0);
}

#[test]
fn test_second_stale_match_gives_up() {
    let temp = TempDir::new().unwrap();
    let site = make_dir(temp.path(), "site");
    let base = make_dir(temp.path(), "base");
    app_fixture(&site);
    app_fixture(&base);

    let fs = Arc::new(MaskedFileSystem::new());
    let mut router = router_with(fs.clone());
    router.add_to_search_path("site", &site, 0).unwrap();
    router.add_to_search_path("base", &base, 1).unwrap();
    router.routes();
    assert_eq!(router.stats().scans, 1);

    // Still listed by every rebuild, but never usable
    fs.mask(&site.join("app1.php"));

    assert_eq!(router.resolve("/app1", None), None);
    assert_eq!(router.stats().scans, 2);
    assert!(base.join("app1.php").is_file());
}

#[test]
fn test_routes_cache_is_per_suffix() {
    let temp = TempDir::new().unwrap();
    let root = make_dir(temp.path(), "app");
    app_fixture(&root);
    write_file(&root, "page.phtml", "<?php");
    let cache: Arc<FileCache> =
        Arc::new(FileCache::new(temp.path().join("cache"), Logger::silent()).unwrap());

    let mut php =
        RouteResolver::new("router", ".php", "index", Arc::new(OsFileSystem), Logger::silent())
            .with_cache(cache.clone());
    php.add_to_search_path("app", &root, 1).unwrap();
    assert_eq!(php.resolve("/page", None).unwrap().path, root.join("index.php"));

    let mut phtml =
        RouteResolver::new("router", ".phtml", "index", Arc::new(OsFileSystem), Logger::silent())
            .with_cache(cache);
    phtml.add_to_search_path("app", &root, 1).unwrap();

    let page = phtml.resolve("/page", None).unwrap();
    assert_eq!(page.path, root.join("page.phtml"));
    assert!(page.remainder.is_empty());
    assert_eq!(phtml.stats().scans, 1);
}

#[test]
fn test_routes_listing() {
    let (_temp, root, mut router) = setup();
    let bindings: Vec<(String, String)> = router
        .routes()
        .walk()
        .into_iter()
        .map(|b| (b.route_prefix.clone(), b.extension.to_string()))
        .collect();

    assert_eq!(
        bindings,
        vec![
            ("/".to_string(), "default".to_string()),
            ("/app1".to_string(), "default".to_string()),
            ("/foo/bar".to_string(), ".json".to_string()),
            ("/foo/bar".to_string(), "default".to_string()),
            ("/foo/boo".to_string(), ".json".to_string()),
        ]
    );
    assert!(router.routes().walk().iter().all(|b| b.path.starts_with(&root)));
}
