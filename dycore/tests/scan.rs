use dycore::{
    decl::{AccessorKind, Declaration},
    scan::{Architecture, DecodeError, NmListingReader, ScanOutcome, Scanner, UnsupportedFeature},
    tests_utils::*,
    utils::{conf::ScanOptions, error::DyError},
};

const LISTING: &str = "\
0000000000001000 T _$s1M3FooC3baryyF
0000000000001100 T _$s1M3FooC3bazSivg
0000000000001200 T _$s1M3FooC6opaqueQryF
0000000000001300 T _$s1M3FooCACycfC
                 U _swift_release
0000000000002000 D _OBJC_CLASS_$_Foo
";

fn decoder() -> TableDecoder {
    TableDecoder::default()
        .with_function(method("M", "Foo", "bar", "_$s1M3FooC3baryyF"))
        .with_function(property_accessor(
            "M",
            "Foo",
            "baz",
            "_$s1M3FooC3bazSivg",
            AccessorKind::Getter,
        ))
        .with(
            "_$s1M3FooC6opaqueQryF",
            Err(DecodeError::Unsupported(UnsupportedFeature::new("opaque return type"))),
        )
        .with_function(constructor("M", "Foo", "__allocating_init", "_$s1M3FooCACycfC"))
}

#[test]
fn unsupported_symbol_is_a_warning() {
    let scanner = Scanner::new(NmListingReader::new(Architecture::Arm64), decoder());
    let ScanOutcome {
        inventory,
        diagnostics,
    } = scanner.scan(LISTING.as_bytes(), "libM.dylib").unwrap();

    assert_eq!(diagnostics.len(), 1, "{:?}", diagnostics);
    assert_eq!(diagnostics.warning_count(), 1);
    assert!(!diagnostics.any_errors());

    let foo = inventory.find_class("M.Foo").expect("Foo should exist");
    assert_eq!(foo.methods().function_count(), 1);
    assert_eq!(foo.properties().len(), 1);
    assert_eq!(foo.constructors().function_count(), 1);
    assert_eq!(
        foo.methods().methods_with_name("bar")[0].offset,
        0x1000,
        "offsets come from the symbol table"
    );
    assert_eq!(inventory.pointer_size(), 8);
}

#[test]
fn leading_unsupported_symbol_does_not_stop_the_scan() {
    let reader = InMemoryImageReader::new(
        Architecture::Arm64,
        [
            ("_$s1M3FooC6opaqueQryF", 0x1000),
            ("_$s1M3FooC3baryyF", 0x1100),
            ("_$s1M3FooC3bazSivg", 0x1200),
            ("_$s1M3FooCACycfC", 0x1300),
        ],
    );
    let ScanOutcome {
        inventory,
        diagnostics,
    } = Scanner::new(reader, decoder()).scan(&[], "libM.dylib").unwrap();

    assert_eq!(diagnostics.len(), 1, "{:?}", diagnostics);
    assert_eq!(diagnostics.warning_count(), 1);
    assert_eq!(diagnostics.error_count(), 0);
    assert_eq!(
        diagnostics.iter().next().map(|d| d.symbol.as_str()),
        Some("_$s1M3FooC6opaqueQryF")
    );

    assert_eq!(inventory.classes().count(), 1);
    let foo = inventory.find_class("M.Foo").expect("Foo should exist");
    let filed = foo.methods().function_count()
        + foo.properties().len()
        + foo.constructors().function_count();
    assert_eq!(filed, 3);
    assert!(foo.properties().get("baz").is_some_and(|baz| baz.getter().is_some()));
    assert_eq!(foo.methods().methods_with_name("bar")[0].offset, 0x1100);
}

#[test]
fn malformed_symbol_is_an_error_and_scan_continues() {
    let reader = InMemoryImageReader::new(
        Architecture::I386,
        [("_$sgarbage", 0x10), ("_$s1M3FooC3baryyF", 0x20)],
    );
    let scanner = Scanner::new(reader, decoder());
    let outcome = scanner.scan(&[], "libM.dylib").unwrap();

    assert_eq!(outcome.diagnostics.error_count(), 1);
    assert_eq!(outcome.inventory.classes().count(), 1);
    assert_eq!(outcome.inventory.pointer_size(), 4);
}

#[test]
fn classification_failure_depends_on_strictness() {
    let reader = InMemoryImageReader::new(
        Architecture::X86_64,
        [("_$s1M3FooCMa", 0x10), ("_$s1M3FooCMa", 0x10)],
    );
    let decoder =
        TableDecoder::default().with_function(class_constructor("M", "Foo", "_$s1M3FooCMa"));

    let lenient = Scanner::new(&reader, &decoder);
    let outcome = lenient.scan(&[], "libM.dylib").unwrap();
    assert_eq!(outcome.diagnostics.error_count(), 1);
    assert!(
        outcome
            .inventory
            .find_class("M.Foo")
            .is_some_and(|foo| foo.class_constructor().is_some())
    );

    let options = ScanOptions {
        strict: true,
        ..ScanOptions::default()
    };
    let strict = Scanner::with_options(&reader, &decoder, options);
    let err = strict.scan(&[], "libM.dylib").unwrap_err();
    assert!(
        matches!(err, DyError::InventoryError { ref symbol, .. } if symbol == "_$s1M3FooCMa"),
        "{}",
        err
    );
}

#[test]
fn privatized_functions_are_skipped() {
    let reader = InMemoryImageReader::new(Architecture::Arm64, [("_$s1M3FooC4helpyyFTf", 0x10)]);
    let decoder = TableDecoder::default().with_function(method(
        "M",
        "Foo",
        "help...",
        "_$s1M3FooC4helpyyFTf",
    ));

    let outcome = Scanner::new(&reader, &decoder).scan(&[], "libM.dylib").unwrap();
    assert!(outcome.inventory.is_empty());
    assert!(outcome.diagnostics.is_empty());

    let options = ScanOptions {
        skip_privatized: false,
        ..ScanOptions::default()
    };
    let outcome = Scanner::with_options(&reader, &decoder, options)
        .scan(&[], "libM.dylib")
        .unwrap();
    assert_eq!(outcome.inventory.classes().count(), 1);
}

/// Decoder that only understands the older mangling scheme.
struct OldManglingOnly;

impl dycore::scan::SymbolDecoder for OldManglingOnly {
    fn decode(
        &self,
        mangled: &str,
        old_mangling: bool,
        offset: u64,
    ) -> Result<Declaration, DecodeError> {
        if !old_mangling {
            return Err(DecodeError::Malformed {
                reason: "expected old mangling".into(),
            });
        }
        let mut func = method("M", "Foo", "bar", mangled);
        func.offset = offset;
        Ok(Declaration::Function(func))
    }
}

#[test]
fn old_mangling_marker_switches_the_whole_image() {
    let reader = InMemoryImageReader::new(
        Architecture::X86_64,
        [("__TFC1M3Foo3barfT_T_", 0x10), ("__TMdC1M3Foo", 0x20)],
    );
    let outcome = Scanner::new(&reader, OldManglingOnly).scan(&[], "libM.dylib").unwrap();

    assert!(!outcome.diagnostics.any_errors(), "{:?}", outcome.diagnostics);
    let bar = outcome
        .inventory
        .find_class("M.Foo")
        .map(|foo| foo.methods().methods_with_name("bar").len());
    // The marker itself decodes as another `bar` overload.
    assert_eq!(bar, Some(2));

    let reader = InMemoryImageReader::new(Architecture::X86_64, [("__TFC1M3Foo3barfT_T_", 0x10)]);
    let outcome = Scanner::new(&reader, OldManglingOnly).scan(&[], "libM.dylib").unwrap();
    assert_eq!(outcome.diagnostics.error_count(), 1);
}

#[test]
fn scan_many_keeps_image_order() {
    let first = "0000000000001000 T _$s1M3FooC3baryyF\n";
    let second = "0000000000001100 T _$s1M3FooC3bazSivg\n0000000000001200 T _$s1M3FooC6opaqueQryF\n";

    let scanner = Scanner::new(NmListingReader::new(Architecture::Arm64), decoder());
    let outcomes = scanner.scan_many([
        ("first.dylib", first.as_bytes()),
        ("second.dylib", second.as_bytes()),
        ("broken.dylib", b"\xff".as_slice()),
    ]);

    assert_eq!(outcomes.len(), 3);
    let outcomes: Vec<_> = outcomes.into_iter().map(Result::unwrap).collect();
    assert_eq!(outcomes[0].inventory.find_class("M.Foo").map(|foo| foo.methods().len()), Some(1));
    assert_eq!(outcomes[1].diagnostics.warning_count(), 1);
    assert!(outcomes[2].inventory.is_empty());
    assert_eq!(outcomes[2].diagnostics.error_count(), 1);
}

#[test]
fn options_round_trip_through_toml() {
    let dir = std::env::temp_dir().join(format!("dyreflect-scan-test-{}", std::process::id()));
    let path = dir.join("nested").join("scan.toml");

    let options = ScanOptions {
        strict: true,
        skip_privatized: false,
        entry_point_prefixes: vec!["_$s".into()],
        ..ScanOptions::default()
    };
    options.save_to_toml(&path).unwrap();
    let loaded = ScanOptions::load_from_toml(&path).unwrap();
    std::fs::remove_dir_all(&dir).ok();

    assert_eq!(loaded, options);
    assert!(matches!(
        ScanOptions::load_from_toml(&path),
        Err(DyError::IoError(_))
    ));
}
