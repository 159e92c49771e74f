use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

use dycore::{
    decl::{AccessorKind, Declaration},
    inventory::ModuleInventory,
    scan::{Architecture, Scanner},
    tests_utils::*,
};
use dyspec::parser::parse_type_spec;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

const ACCESSORS: [AccessorKind; 3] = [
    AccessorKind::Getter,
    AccessorKind::Setter,
    AccessorKind::ModifyAccessor,
];

/// Synthetic symbol table: a few modules of classes, each with a random mix
/// of constructors, methods, properties, static functions (half of them with
/// a thunk) and metadata records. Mangled names are unique.
fn build_declarations(types: usize) -> Vec<Declaration> {
    let mut rng = ChaCha20Rng::seed_from_u64(0x42);
    let mut decls = Vec::new();

    for index in 0..types {
        let module = format!("M{}", index % 4);
        let ty = format!("T{}", index);
        let prefix = format!("_$s{}{}", module, ty);

        decls.push(Declaration::Function(class_constructor(
            &module,
            &ty,
            &format!("{}Ma", prefix),
        )));
        decls.push(Declaration::Metaclass(type_record(&module, &ty, &format!("{}Mm", prefix))));
        decls.push(Declaration::Function(constructor(
            &module,
            &ty,
            "__allocating_init",
            &format!("{}fC", prefix),
        )));

        for member in 0..rng.random_range(1..16) {
            let name = format!("m{}", rng.random_range(0..8));
            let mangled = format!("{}{}_{}", prefix, name, member);
            let func = match rng.random_range(0..=3) {
                0 => method(&module, &ty, &name, &mangled),
                1 => {
                    let kind = ACCESSORS[member % ACCESSORS.len()];
                    property_accessor(&module, &ty, &format!("p{}", member), &mangled, kind)
                }
                2 => static_function(&module, &ty, &format!("s{}", member), &mangled, false),
                _ => {
                    let name = format!("s{}", member);
                    decls.push(Declaration::Function(static_function(
                        &module,
                        &ty,
                        &name,
                        &format!("{}Tj", mangled),
                        true,
                    )));
                    static_function(&module, &ty, &name, &mangled, false)
                }
            };
            decls.push(Declaration::Function(func));
        }
    }

    decls
}

fn bench_classify(c: &mut Criterion) {
    let decls = build_declarations(512);

    c.bench_function("classify_512_types", |b| {
        b.iter_batched(
            || decls.clone(),
            |decls| {
                let mut inventory = ModuleInventory::new(Architecture::Arm64);
                for decl in decls {
                    // Random member names may collide; only throughput matters here.
                    let _ = inventory.add(decl);
                }
                black_box(inventory)
            },
            BatchSize::LargeInput,
        )
    });

    let inventory = {
        let mut inventory = ModuleInventory::new(Architecture::Arm64);
        for decl in decls.iter().cloned() {
            let _ = inventory.add(decl);
        }
        inventory
    };
    c.bench_function("find_class", |b| {
        b.iter(|| black_box(inventory.find_class(black_box("M3.T511"))))
    });
}

fn bench_scan(c: &mut Criterion) {
    let decls = build_declarations(128);
    let reader = InMemoryImageReader::new(
        Architecture::X86_64,
        decls.iter().map(|decl| (decl.mangled_name(), decl.offset())),
    );
    let decoder = decls.iter().cloned().fold(TableDecoder::default(), |decoder, decl| {
        let mangled = decl.mangled_name().to_string();
        decoder.with(&mangled, Ok(decl))
    });
    let scanner = Scanner::new(reader, decoder);

    c.bench_function("scan_128_types", |b| {
        b.iter(|| black_box(scanner.scan(&[], "bench.dylib")))
    });
}

fn bench_parse_type_spec(c: &mut Criterion) {
    let inputs = [
        "Swift.Int",
        "(label: Swift.Int, Swift.String) -> Swift.Bool",
        "@escaping (Swift.Int) throws -> [Swift.String: Swift.Int]?",
        "Swift.Dictionary<Swift.String, Swift.Array<M.Foo>>.Index",
        "M.Proto & Swift.Hashable & Swift.Equatable",
    ];

    c.bench_function("parse_type_spec", |b| {
        b.iter(|| {
            for input in &inputs {
                black_box(parse_type_spec(black_box(input)).ok());
            }
        })
    });
}

criterion_group!(benches, bench_classify, bench_scan, bench_parse_type_spec);
criterion_main!(benches);
