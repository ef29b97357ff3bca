//! Tests for the blob encoding pipeline

mod common;

use common::sample_map;
use linemap_core::codec::{decode, encode};
use linemap_core::table::Symbol;
use linemap_core::{Address, LineMap, SymbolId};
use proptest::prelude::*;

#[test]
fn test_round_trip_preserves_tables()
{
    let map = sample_map();
    let decoded = decode(&encode(&map).unwrap()).unwrap();

    assert_eq!(decoded, map);
    assert_eq!(decoded.resolve(SymbolId(0x0600_0001), 7), map.resolve(SymbolId(0x0600_0001), 7));
}

#[test]
fn test_empty_map_and_empty_blob()
{
    let decoded = decode(&encode(&LineMap::new()).unwrap()).unwrap();
    assert!(decoded.is_empty());
    assert!(decode(&[]).unwrap().is_empty());
}

#[test]
fn test_decoded_unsorted_table_still_resolves()
{
    let mut map = LineMap::new();
    map.add_symbol(Symbol::new(1, "f", 0));
    map.add_address_to_line(3, Address::new(30), "b.rs", "m");
    map.add_address_to_line(1, Address::new(10), "a.rs", "m");

    let decoded = decode(&encode(&map).unwrap()).unwrap();
    assert!(!decoded.lines().is_sorted());
    assert_eq!(decoded.resolve(SymbolId(1), 15).map(|r| r.line), Some(1));
}

proptest! {
    #[test]
    fn prop_decode_never_panics(blob in proptest::collection::vec(any::<u8>(), 0..256))
    {
        let _ = decode(&blob);
    }

    #[test]
    fn prop_round_trip_preserves_arbitrary_maps(
        symbols in proptest::collection::vec((any::<u64>(), any::<String>(), any::<u64>()), 0..24),
        records in proptest::collection::vec((any::<u32>(), any::<u64>(), any::<String>(), any::<String>()), 0..48),
    )
    {
        let mut map = LineMap::new();
        for (id, name, address) in symbols {
            map.add_symbol(Symbol::new(id, name, address));
        }
        for (line, address, source_file, object_name) in &records {
            map.add_address_to_line(*line, Address::new(*address), source_file, object_name);
        }

        let decoded = decode(&encode(&map).unwrap()).unwrap();
        prop_assert_eq!(decoded, map);
    }

    #[test]
    fn prop_round_trip_resolves_identically(
        addresses in proptest::collection::vec(0u64..4096, 1..40),
        offset in 0i64..4096,
    )
    {
        let mut map = LineMap::new();
        map.add_symbol(Symbol::new(1, "f", 0));
        for (line, address) in addresses.iter().enumerate() {
            let line = u32::try_from(line).unwrap();
            map.add_address_to_line(line + 1, Address::new(*address), "src/lib.rs", "lib");
        }

        let decoded = decode(&encode(&map).unwrap()).unwrap();
        prop_assert_eq!(decoded.resolve(SymbolId(1), offset), map.resolve(SymbolId(1), offset));
    }
}
