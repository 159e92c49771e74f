use dycore::{
    decl::{
        AccessorKind, Declaration, FunctionDecl, NominalKind, NominalName, PropertySignature,
        Signature, TypeRecord, VariableDecl,
    },
    inventory::{ModuleInventory, PropertyBucket},
    scan::Architecture,
    tests_utils::*,
    utils::error::Slot,
};
use dyspec::types::TypeSpec;

fn add_all(inventory: &mut ModuleInventory, decls: impl IntoIterator<Item = FunctionDecl>) {
    for decl in decls {
        inventory
            .add(Declaration::Function(decl))
            .expect("declaration should classify");
    }
}

#[test]
fn foo_with_constructor_property_and_static_function() {
    let mut inventory = ModuleInventory::new(Architecture::X86_64);
    add_all(
        &mut inventory,
        [
            constructor("M", "Foo", "__allocating_init", "_$s1M3FooCACycfC"),
            property_accessor("M", "Foo", "bar", "_$s1M3FooC3barSivg", AccessorKind::Getter),
            static_function("M", "Foo", "baz", "_$s1M3FooC3bazyyFZ", false),
            static_function("M", "Foo", "baz", "_$s1M3FooC3bazyyFZTj", true),
        ],
    );

    assert_eq!(inventory.module_names().collect::<Vec<_>>(), ["M"]);
    let foo = inventory.find_class("M.Foo").expect("Foo should exist");

    assert_eq!(foo.constructors().function_count(), 1);

    let bar = foo.properties().get("bar").expect("bar should be a property");
    assert!(bar.getter().is_some(), "bar has a getter");
    assert!(bar.setter().is_none(), "bar has no setter");

    let baz = foo.static_functions().get("baz").expect("baz should be filed");
    assert_eq!(baz.len(), 1, "the thunk must not be a second overload");
    let sig = baz.functions()[0]
        .signature
        .as_static_function()
        .expect("baz is a static function");
    assert!(!sig.is_thunk);
    assert_eq!(
        sig.thunk.as_ref().map(|thunk| thunk.mangled_name.as_str()),
        Some("_$s1M3FooC3bazyyFZTj")
    );
}

#[test]
fn thunk_before_canonical_is_replaced() {
    let mut inventory = ModuleInventory::default();
    add_all(
        &mut inventory,
        [
            static_function("M", "Foo", "baz", "_$s1M3FooC3bazyyFZTj", true),
            static_function("M", "Foo", "baz", "_$s1M3FooC3bazyyFZ", false),
        ],
    );

    let baz = inventory
        .find_class("M.Foo")
        .and_then(|foo| foo.static_functions().get("baz"))
        .expect("baz should be filed");
    assert_eq!(baz.len(), 1);

    let canonical = &baz.functions()[0];
    assert_eq!(canonical.mangled_name, "_$s1M3FooC3bazyyFZ");
    let thunk = canonical
        .signature
        .as_static_function()
        .and_then(|sig| sig.thunk.as_deref())
        .expect("thunk should be linked");
    assert_eq!(thunk.mangled_name, "_$s1M3FooC3bazyyFZTj");
    assert!(thunk.signature.is_thunk);
}

#[test]
fn distinct_static_overloads_are_kept() {
    let mut inventory = ModuleInventory::default();
    let mut throwing = static_function("M", "Foo", "baz", "_$s1M3FooC3bazyyKFZ", false);
    if let Some(sig) = throwing.signature.as_static_function_mut() {
        sig.throws = true;
    }
    add_all(
        &mut inventory,
        [
            static_function("M", "Foo", "baz", "_$s1M3FooC3bazyyFZ", false),
            throwing,
            // A thunk of the non-throwing overload only.
            static_function("M", "Foo", "baz", "_$s1M3FooC3bazyyFZTj", true),
        ],
    );

    let baz = inventory
        .find_class("M.Foo")
        .and_then(|foo| foo.static_functions().get("baz"))
        .expect("baz should be filed");
    assert_eq!(baz.len(), 2);
    let linked = baz
        .functions()
        .iter()
        .filter(|func| func.signature.as_static_function().is_some_and(|sig| sig.thunk.is_some()))
        .count();
    assert_eq!(linked, 1);
}

#[test]
fn duplicate_singletons_are_reported_with_owner() {
    let mut inventory = ModuleInventory::default();
    inventory
        .add(Declaration::Function(class_constructor("M", "Foo", "_$s1M3FooCMa")))
        .unwrap();

    let err = inventory
        .add(Declaration::Function(class_constructor("M", "Foo", "_$s1M3FooCMa")))
        .unwrap_err();
    assert_eq!(err.slot(), Slot::ClassConstructor);
    assert!(err.to_string().contains("`M.Foo`"), "{}", err);

    let records: [(fn(TypeRecord) -> Declaration, Slot, &str); 4] = [
        (Declaration::DirectMetadata, Slot::DirectMetadata, "_$s1M3FooCN"),
        (Declaration::LazyCacheVariable, Slot::LazyCacheVariable, "_$s1M3FooCML"),
        (Declaration::Metaclass, Slot::Metaclass, "_$s1M3FooCMm"),
        (Declaration::NominalTypeDescriptor, Slot::NominalTypeDescriptor, "_$s1M3FooCMn"),
    ];
    for (wrap, slot, mangled) in records {
        inventory.add(wrap(type_record("M", "Foo", mangled))).unwrap();
        let err = inventory.add(wrap(type_record("M", "Foo", mangled))).unwrap_err();
        assert_eq!(err.slot(), slot, "{}", mangled);
        assert!(err.to_string().contains("`M.Foo`"), "{}", err);
    }

    let foo = inventory.find_class("M.Foo").unwrap();
    assert!(foo.lazy_cache_variable().is_some());
    assert!(foo.nominal_type_descriptor().is_some());
}

#[test]
fn second_getter_through_the_inventory_is_reported() {
    let mut inventory = ModuleInventory::default();
    inventory
        .add(Declaration::Function(property_accessor(
            "M",
            "Foo",
            "bar",
            "_$s1M3FooC3barSivg",
            AccessorKind::Getter,
        )))
        .unwrap();

    let err = inventory
        .add(Declaration::Function(property_accessor(
            "M",
            "Foo",
            "bar",
            "_$s1M3FooC3barSivgAlt",
            AccessorKind::Getter,
        )))
        .unwrap_err();
    assert_eq!(err.slot(), Slot::Accessor(AccessorKind::Getter));
    assert!(err.to_string().contains("`bar`"), "{}", err);

    let bar = inventory
        .find_class("M.Foo")
        .and_then(|foo| foo.properties().get("bar"))
        .expect("bar should be a property");
    assert_eq!(
        bar.getter().map(|getter| getter.mangled_name.as_str()),
        Some("_$s1M3FooC3barSivg")
    );
}

#[test]
fn duplicate_overload_is_reported_with_member() {
    let mut inventory = ModuleInventory::default();
    let func = method("M", "Foo", "bar", "_$s1M3FooC3baryyF");
    inventory.add(Declaration::Function(func.clone())).unwrap();

    let err = inventory.add(Declaration::Function(func)).unwrap_err();
    assert_eq!(err.slot(), Slot::Overload);
    assert!(err.to_string().contains("_$s1M3FooC3baryyF"), "{}", err);
}

#[test]
fn every_accessor_kind_has_its_own_slot() {
    let mut inventory = ModuleInventory::default();
    for (index, kind) in [
        AccessorKind::Getter,
        AccessorKind::Setter,
        AccessorKind::Materializer,
        AccessorKind::WillSet,
        AccessorKind::DidSet,
        AccessorKind::ModifyAccessor,
    ]
    .into_iter()
    .enumerate()
    {
        let mangled = format!("_$s1M3FooC5countSiv{}", index);
        inventory
            .add(Declaration::Function(property_accessor("M", "Foo", "count", &mangled, kind)))
            .unwrap();
    }

    let foo = inventory.find_class("M.Foo").unwrap();
    let count = foo.property_bucket(PropertyBucket::Instance).get("count").unwrap();
    assert_eq!(count.accessors().count(), 6);
    assert!(count.will_set().is_some());
    assert!(count.modify_accessor().is_some());
    assert_eq!(count.property_type(), Some(&TypeSpec::named("Swift.Int")));
}

#[test]
fn subscripts_and_private_subscripts() {
    let mut inventory = ModuleInventory::default();
    let mut public = property_accessor(
        "M",
        "Foo",
        "subscript",
        "_$s1M3FooCyS2icig",
        AccessorKind::Getter,
    );
    public.signature = Signature::Property(
        PropertySignature::new(AccessorKind::Getter, TypeSpec::named("Swift.Int"))
            .subscript([TypeSpec::named("Swift.Int")]),
    );
    let mut private = public.clone();
    private.mangled_name.push('P');
    private.signature = Signature::Property(
        PropertySignature::new(AccessorKind::Getter, TypeSpec::named("Swift.Int"))
            .subscript([TypeSpec::named("Swift.String")])
            .with_private(true),
    );
    add_all(&mut inventory, [public, private]);

    let foo = inventory.find_class("M.Foo").unwrap();
    assert_eq!(foo.subscripts().len(), 1);
    assert_eq!(foo.private_subscripts().len(), 1);
    assert!(foo.properties().is_empty());
    assert!(foo.private_properties().is_empty());
}

#[test]
fn protocols_structs_and_free_declarations() {
    let mut inventory = ModuleInventory::default();

    let mut requirement = method("M", "Shape", "area", "_$s1M5ShapeP4areaSdyFTq");
    requirement.owner = Some(NominalName::protocol("M", ["Shape"]));
    requirement.signature = Signature::UncurriedFunction {
        instance: TypeSpec::named("M.Shape"),
        parameters: TypeSpec::empty_tuple(),
        returns: TypeSpec::named("Swift.Double"),
        throws: false,
    };
    inventory.add(Declaration::MethodDescriptor(requirement)).unwrap();

    let mut point = type_record("M", "Point", "_$s1M5PointVMn");
    point.owner = NominalName::new("M", ["Point"], NominalKind::Struct);
    inventory.add(Declaration::NominalTypeDescriptor(point)).unwrap();

    inventory
        .add(Declaration::Variable(VariableDecl {
            module: "M".into(),
            owner: None,
            name: "counter".into(),
            mangled_name: "_$s1M7counterSivp".into(),
            offset: 0x40,
            of_type: TypeSpec::named("Swift.Int"),
            is_static: false,
        }))
        .unwrap();

    let shape = inventory.find_protocol("M.Shape").expect("protocol should be filed");
    assert_eq!(shape.method_descriptors().function_count(), 1);
    assert!(shape.methods().is_empty());

    let structs: Vec<_> = inventory.classes_of_kind("M", NominalKind::Struct).collect();
    assert_eq!(structs.len(), 1);
    assert!(structs[0].nominal_type_descriptor().is_some());
    assert_eq!(inventory.classes_of_kind("M", NominalKind::Class).count(), 0);

    let module = inventory.module("M").unwrap();
    assert_eq!(module.variables().get("counter").len(), 1);
    assert_eq!(inventory.protocols_for_module("M").count(), 1);
    assert!(inventory.find_class("Other.Foo").is_none());
}

#[test]
fn unknown_destinations_are_kept() {
    let mut inventory = ModuleInventory::default();
    inventory
        .add(Declaration::Function(constructor("M", "Foo", "make", "_$s1M3FooC4makeACycfC")))
        .unwrap();
    inventory
        .add(Declaration::Function(method("M", "Bar", "bar", "_$s1M3BarC3baryyF")))
        .unwrap();

    let mut stray = method("M", "Bar", "bar", "_$s1M3FooC3baryyFBar");
    stray.owner = Some(NominalName::class("M", ["Foo"]));
    inventory.add(Declaration::Function(stray)).unwrap();

    let foo = inventory.find_class("M.Foo").unwrap();
    assert_eq!(foo.functions_of_unknown_destination().len(), 2);
    assert!(foo.constructors().is_empty());
    assert_eq!(
        inventory.find_class("M.Bar").map(|bar| bar.methods().function_count()),
        Some(1)
    );
}
