//! Contents of one nominal type
//!
//! [`TypeContents::add`] files every declaration owned by a class, struct,
//! enum or protocol into exactly one bucket. Non-function declarations go to
//! the bucket of their variant. Function declarations are routed by the
//! shape of their signature, see [`Destination`].
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    decl::{
        AccessorKind, ConformanceDecl, Declaration, FunctionDecl, NominalName, Signature, Thunk,
        TypeRecord, VariableDecl,
        signature::{is_constructor_name, is_destructor_name},
    },
    inventory::{
        function::FunctionInventory,
        property::{PropertyInventory, PropertyRecord},
        variable::VariableInventory,
        witness::WitnessInventory,
    },
    magic::MANGLING_PREFIX_LEN,
    utils::error::{InventoryError, Slot},
};

/// One of the four property buckets of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyBucket {
    Instance,
    Private,
    Static,
    StaticPrivate,
}

impl PropertyBucket {
    pub fn of(is_static: bool, is_private: bool) -> Self {
        match (is_static, is_private) {
            (false, false) => PropertyBucket::Instance,
            (false, true) => PropertyBucket::Private,
            (true, false) => PropertyBucket::Static,
            (true, true) => PropertyBucket::StaticPrivate,
        }
    }
}

/// Where a function declaration is filed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Constructors,
    ClassConstructor,
    Destructors,
    Subscripts { is_private: bool },
    Property {
        bucket: PropertyBucket,
        accessor: AccessorKind,
    },
    Methods,
    MethodDescriptors,
    StaticFunctions,
    WitnessTable,
    Initializers,
    Unknown,
}

impl Destination {
    /// Classify a function declaration owned by `owner`.
    ///
    /// Checks run in a fixed order and the first match wins:
    ///
    /// 1. constructor with a constructor member name,
    /// 2. type metadata accessor,
    /// 3. destructor with a destructor member name,
    /// 4. property accessor (subscripts first, then by static/private),
    /// 5. method uncurried over an instance of `owner`,
    /// 6. static function,
    /// 7. witness table,
    /// 8. initializer,
    /// 9. anything else is of unknown destination.
    pub fn of(owner: &NominalName, func: &FunctionDecl, is_descriptor: bool) -> Self {
        match &func.signature {
            Signature::Constructor { name, .. } if is_constructor_name(name) => {
                Destination::Constructors
            }
            Signature::ClassConstructor { .. } => Destination::ClassConstructor,
            Signature::Destructor { name } if is_destructor_name(name) => Destination::Destructors,
            Signature::Property(prop) if prop.is_subscript => Destination::Subscripts {
                is_private: prop.is_private,
            },
            Signature::Property(prop) => Destination::Property {
                bucket: PropertyBucket::of(prop.is_static, prop.is_private),
                accessor: prop.accessor,
            },
            sig @ Signature::UncurriedFunction { .. } if sig.is_method_on(owner) => {
                if is_descriptor {
                    Destination::MethodDescriptors
                } else {
                    Destination::Methods
                }
            }
            Signature::StaticFunction(_) => Destination::StaticFunctions,
            Signature::WitnessTable { .. } => Destination::WitnessTable,
            Signature::Initializer { .. } => Destination::Initializers,
            _ => Destination::Unknown,
        }
    }
}

/// Everything the image exports for one nominal type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeContents {
    name: NominalName,

    constructors: FunctionInventory,
    class_constructor: Option<FunctionDecl>,
    destructors: FunctionInventory,

    properties: PropertyInventory,
    static_properties: PropertyInventory,
    private_properties: PropertyInventory,
    static_private_properties: PropertyInventory,
    subscripts: Vec<FunctionDecl>,
    private_subscripts: Vec<FunctionDecl>,

    methods: FunctionInventory,
    method_descriptors: FunctionInventory,
    static_functions: FunctionInventory,
    witness_table: WitnessInventory,
    initializers: FunctionInventory,

    variables: VariableInventory,
    property_descriptors: Vec<VariableDecl>,
    protocol_conformance_descriptors: Vec<ConformanceDecl>,

    direct_metadata: Option<TypeRecord>,
    lazy_cache_variable: Option<TypeRecord>,
    metaclass: Option<TypeRecord>,
    nominal_type_descriptor: Option<TypeRecord>,

    functions_of_unknown_destination: Vec<FunctionDecl>,
}

impl TypeContents {
    pub fn new(name: NominalName) -> Self {
        Self {
            name,
            constructors: FunctionInventory::default(),
            class_constructor: None,
            destructors: FunctionInventory::default(),
            properties: PropertyInventory::default(),
            static_properties: PropertyInventory::default(),
            private_properties: PropertyInventory::default(),
            static_private_properties: PropertyInventory::default(),
            subscripts: Vec::new(),
            private_subscripts: Vec::new(),
            methods: FunctionInventory::default(),
            method_descriptors: FunctionInventory::default(),
            static_functions: FunctionInventory::default(),
            witness_table: WitnessInventory::default(),
            initializers: FunctionInventory::default(),
            variables: VariableInventory::default(),
            property_descriptors: Vec::new(),
            protocol_conformance_descriptors: Vec::new(),
            direct_metadata: None,
            lazy_cache_variable: None,
            metaclass: None,
            nominal_type_descriptor: None,
            functions_of_unknown_destination: Vec::new(),
        }
    }

    pub fn add(&mut self, decl: Declaration) -> Result<(), InventoryError> {
        match decl {
            Declaration::Function(func) => self.add_function(func, false),
            Declaration::MethodDescriptor(func) => self.add_function(func, true),
            Declaration::DirectMetadata(record) => {
                Self::fill_slot(&mut self.direct_metadata, record, Slot::DirectMetadata, &self.name)
            }
            Declaration::LazyCacheVariable(record) => Self::fill_slot(
                &mut self.lazy_cache_variable,
                record,
                Slot::LazyCacheVariable,
                &self.name,
            ),
            Declaration::Metaclass(record) => {
                Self::fill_slot(&mut self.metaclass, record, Slot::Metaclass, &self.name)
            }
            Declaration::NominalTypeDescriptor(record) => Self::fill_slot(
                &mut self.nominal_type_descriptor,
                record,
                Slot::NominalTypeDescriptor,
                &self.name,
            ),
            Declaration::Variable(var) => {
                self.variables.add(var);
                Ok(())
            }
            Declaration::PropertyDescriptor(var) => {
                self.property_descriptors.push(var);
                Ok(())
            }
            Declaration::ProtocolConformanceDescriptor(conformance) => {
                self.protocol_conformance_descriptors.push(conformance);
                Ok(())
            }
        }
    }

    fn fill_slot<T>(
        slot: &mut Option<T>,
        value: T,
        kind: Slot,
        owner: &NominalName,
    ) -> Result<(), InventoryError> {
        if slot.is_some() {
            return Err(InventoryError::duplicate(kind, owner.fully_qualified_name(), None));
        }
        *slot = Some(value);
        Ok(())
    }

    fn add_function(
        &mut self,
        func: FunctionDecl,
        is_descriptor: bool,
    ) -> Result<(), InventoryError> {
        let destination = Destination::of(&self.name, &func, is_descriptor);
        debug!("{} `{}` -> {:?}", self.name, func.mangled_name, destination);

        match destination {
            Destination::Constructors => self.constructors.add(func),
            Destination::ClassConstructor => Self::fill_slot(
                &mut self.class_constructor,
                func,
                Slot::ClassConstructor,
                &self.name,
            ),
            Destination::Destructors => self.destructors.add(func),
            Destination::Subscripts { is_private: true } => {
                self.private_subscripts.push(func);
                Ok(())
            }
            Destination::Subscripts { is_private: false } => {
                self.subscripts.push(func);
                Ok(())
            }
            Destination::Property { bucket, accessor } => {
                self.property_bucket_mut(bucket).add(func, accessor, is_descriptor)
            }
            Destination::Methods => self.methods.add(func),
            Destination::MethodDescriptors => self.method_descriptors.add(func),
            Destination::StaticFunctions => self.add_static_function(func),
            Destination::WitnessTable => {
                if let Err(func) = self.witness_table.add(func) {
                    self.functions_of_unknown_destination.push(func);
                }
                Ok(())
            }
            Destination::Initializers => self.initializers.add(func),
            Destination::Unknown => {
                self.functions_of_unknown_destination.push(func);
                Ok(())
            }
        }
    }

    /// File a static function, linking it with an already filed thunk
    /// counterpart if there is one.
    ///
    /// The canonical (non-thunk) declaration always ends up in the overload
    /// set and carries the thunk, whichever of the two arrives first. Filing
    /// the linked thunk again is a duplicate overload. A different thunk
    /// replaces the linked one.
    fn add_static_function(&mut self, func: FunctionDecl) -> Result<(), InventoryError> {
        let Some(existing) = self.static_functions.contains_equivalent_function(&func) else {
            return self.static_functions.add(func);
        };
        let existing_mangled_name = existing.mangled_name.clone();

        if existing.is_thunk() {
            let thunk = Self::thunk_of(existing);
            let mut canonical = func;
            if let Some(sig) = canonical.signature.as_static_function_mut() {
                sig.thunk = thunk.map(Box::new);
            }
            debug!(
                "linking thunk `{}` into `{}`",
                existing_mangled_name, canonical.mangled_name
            );
            if let Err(canonical) = self
                .static_functions
                .replace_function(&existing_mangled_name, canonical)
            {
                return self.static_functions.add(canonical);
            }
        } else {
            let owner = func.owner_name();
            let Some(sig) = self
                .static_functions
                .function_mut(&func.name, &existing_mangled_name)
                .and_then(|canonical| canonical.signature.as_static_function_mut())
            else {
                return Ok(());
            };

            match &sig.thunk {
                Some(linked) if linked.mangled_name == func.mangled_name => {
                    return Err(InventoryError::duplicate(
                        Slot::Overload,
                        owner,
                        Some(&func.mangled_name),
                    ));
                }
                Some(linked) => warn!(
                    "thunk `{}` of `{}` replaced by `{}`",
                    linked.mangled_name, existing_mangled_name, func.mangled_name
                ),
                None => debug!(
                    "linking thunk `{}` into `{}`",
                    func.mangled_name, existing_mangled_name
                ),
            }
            sig.thunk = Self::thunk_of(&func).map(Box::new);
        }
        Ok(())
    }

    fn thunk_of(func: &FunctionDecl) -> Option<Thunk> {
        let mut signature = func.signature.as_static_function()?.clone();
        signature.thunk = None;
        Some(Thunk {
            mangled_name: func.mangled_name.clone(),
            offset: func.offset,
            signature,
        })
    }

    fn property_bucket_mut(&mut self, bucket: PropertyBucket) -> &mut PropertyInventory {
        match bucket {
            PropertyBucket::Instance => &mut self.properties,
            PropertyBucket::Private => &mut self.private_properties,
            PropertyBucket::Static => &mut self.static_properties,
            PropertyBucket::StaticPrivate => &mut self.static_private_properties,
        }
    }

    pub fn property_bucket(&self, bucket: PropertyBucket) -> &PropertyInventory {
        match bucket {
            PropertyBucket::Instance => &self.properties,
            PropertyBucket::Private => &self.private_properties,
            PropertyBucket::Static => &self.static_properties,
            PropertyBucket::StaticPrivate => &self.static_private_properties,
        }
    }

    /// A function is final unless a witness table entry refers to it, i.e.
    /// some entry's mangled name ends with the function's mangled name minus
    /// its mangling prefix.
    pub fn is_final(&self, func: &FunctionDecl) -> bool {
        let Some(suffix) = func.mangled_name.get(MANGLING_PREFIX_LEN..) else {
            return true;
        };
        if suffix.is_empty() {
            return true;
        }
        !self
            .witness_table
            .mangled_names()
            .any(|entry| entry.ends_with(suffix))
    }

    /// Records named `name` from the instance, private, static and
    /// static-private buckets, in that order.
    pub fn all_properties_with_name(&self, name: &str) -> SmallVec<&PropertyRecord, 4> {
        [
            &self.properties,
            &self.private_properties,
            &self.static_properties,
            &self.static_private_properties,
        ]
        .into_iter()
        .filter_map(|bucket| bucket.get(name))
        .collect()
    }

    pub fn name(&self) -> &NominalName {
        &self.name
    }

    pub fn constructors(&self) -> &FunctionInventory {
        &self.constructors
    }

    /// The type metadata accessor.
    pub fn class_constructor(&self) -> Option<&FunctionDecl> {
        self.class_constructor.as_ref()
    }

    pub fn destructors(&self) -> &FunctionInventory {
        &self.destructors
    }

    pub fn properties(&self) -> &PropertyInventory {
        &self.properties
    }

    pub fn static_properties(&self) -> &PropertyInventory {
        &self.static_properties
    }

    pub fn private_properties(&self) -> &PropertyInventory {
        &self.private_properties
    }

    pub fn static_private_properties(&self) -> &PropertyInventory {
        &self.static_private_properties
    }

    pub fn subscripts(&self) -> &[FunctionDecl] {
        &self.subscripts
    }

    pub fn private_subscripts(&self) -> &[FunctionDecl] {
        &self.private_subscripts
    }

    pub fn methods(&self) -> &FunctionInventory {
        &self.methods
    }

    pub fn method_descriptors(&self) -> &FunctionInventory {
        &self.method_descriptors
    }

    pub fn static_functions(&self) -> &FunctionInventory {
        &self.static_functions
    }

    pub fn witness_table(&self) -> &WitnessInventory {
        &self.witness_table
    }

    pub fn initializers(&self) -> &FunctionInventory {
        &self.initializers
    }

    pub fn variables(&self) -> &VariableInventory {
        &self.variables
    }

    pub fn property_descriptors(&self) -> &[VariableDecl] {
        &self.property_descriptors
    }

    pub fn protocol_conformance_descriptors(&self) -> &[ConformanceDecl] {
        &self.protocol_conformance_descriptors
    }

    pub fn direct_metadata(&self) -> Option<&TypeRecord> {
        self.direct_metadata.as_ref()
    }

    pub fn lazy_cache_variable(&self) -> Option<&TypeRecord> {
        self.lazy_cache_variable.as_ref()
    }

    pub fn metaclass(&self) -> Option<&TypeRecord> {
        self.metaclass.as_ref()
    }

    pub fn nominal_type_descriptor(&self) -> Option<&TypeRecord> {
        self.nominal_type_descriptor.as_ref()
    }

    pub fn functions_of_unknown_destination(&self) -> &[FunctionDecl] {
        &self.functions_of_unknown_destination
    }
}
