//! Tests for call-site resolution and the per-module cache

mod common;

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use common::sample_map;
use linemap_core::error::Result;
use linemap_core::store::write_sidecar;
use linemap_core::{codec, LineMap, MapLoader, ModuleIdentity, ResolvedLine, Resolver, SymbolId, OFFSET_UNKNOWN};

/// Serves `sample_map` for every module and counts loads.
#[derive(Default)]
struct CountingLoader
{
    loads: AtomicUsize,
}

impl MapLoader for CountingLoader
{
    fn load(&self, _module: &ModuleIdentity) -> Result<Option<LineMap>>
    {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Some(sample_map()))
    }
}

#[test]
fn test_resolves_through_filesystem()
{
    let dir = tempfile::tempdir().unwrap();
    let module = dir.path().join("TestApp1.exe");
    write_sidecar(&module, &codec::encode(&sample_map()).unwrap()).unwrap();

    let resolver = Resolver::new();
    let resolved = resolver.resolve(&ModuleIdentity::from(module.as_path()), SymbolId(0x0600_0001), 7);
    assert_eq!(
        resolved,
        Some(ResolvedLine {
            line: 51,
            source_file: "...\\src\\TestApp1\\Program.cs".to_string(),
        })
    );
}

#[test]
fn test_unresolved_cases()
{
    let resolver = Resolver::with_loader(CountingLoader::default());
    let module = ModuleIdentity::from("TestApp1.exe");

    assert_eq!(resolver.resolve(&module, SymbolId(0xdead_beef), 0), None);
    assert_eq!(resolver.resolve(&module, SymbolId(0x0600_0001), OFFSET_UNKNOWN), None);
    assert_eq!(resolver.resolve(&module, SymbolId(0x0600_0001), -1_000), None);
    assert_eq!(resolver.resolve(&module, SymbolId(0x0600_0002), -41), None);
}

#[test]
fn test_missing_and_corrupt_maps_are_unresolved()
{
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nomap.exe");
    let corrupt = dir.path().join("corrupt.exe");
    fs::write(dir.path().join("corrupt.exe.lmp"), [0x5a; 48]).unwrap();

    let resolver = Resolver::new();
    assert_eq!(resolver.resolve(&ModuleIdentity::from(missing.as_path()), SymbolId(1), 0), None);
    assert_eq!(resolver.resolve(&ModuleIdentity::from(corrupt.as_path()), SymbolId(1), 0), None);
    assert_eq!(resolver.cached_len(), 2);
}

#[test]
fn test_map_loaded_once_per_module()
{
    let resolver = Resolver::with_loader(CountingLoader::default());
    let module = ModuleIdentity::from("TestApp1.exe");

    for offset in 0..10 {
        assert!(resolver.resolve(&module, SymbolId(0x0600_0001), offset).is_some());
    }
    assert_eq!(resolver.loader().loads.load(Ordering::SeqCst), 1);
}

#[test]
fn test_concurrent_resolution_is_consistent()
{
    let resolver = Resolver::with_loader(CountingLoader::default());
    let module = ModuleIdentity::from("TestApp1.exe");
    let expected = sample_map().resolve(SymbolId(0x0600_0002), 3);

    thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..100 {
                    assert_eq!(resolver.resolve(&module, SymbolId(0x0600_0002), 3), expected);
                }
            });
        }
    });

    assert_eq!(resolver.cached_len(), 1);
    // Racing threads may each load once; hits afterwards never load.
    assert!(resolver.loader().loads.load(Ordering::SeqCst) <= 8);
}
