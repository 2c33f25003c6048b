//! file: core/src/sil/kind.rs
//! description: the closed set of source-IR instruction kinds.
//!
//! `InstKind` enumerates every instruction the lowering pass understands.
//! Payloads carry only what operands cannot: literal values, member and
//! case names, and successor blocks. Operand conventions are noted on the
//! variants where the order is not obvious. Anything outside the closed set
//! is kept as `InstKind::Unknown` so lowering can degrade gracefully.

use super::ids::BlockId;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum InstKind {
    // Allocation and deallocation
    AllocStack { var_name: Option<String> },
    AllocBox { var_name: Option<String> },
    /// Operands: tail-allocation counts.
    AllocRef,
    AllocValueBuffer,
    AllocGlobal { global: String },
    ProjectBox { field_index: u32 },
    ProjectValueBuffer,
    DeallocStack,
    DeallocBox,
    DeallocRef,
    DeallocValueBuffer,

    // Debug information
    DebugValue { var_name: String },
    DebugValueAddr { var_name: String },

    // Accessing memory
    Load,
    /// Operands: value, destination address.
    Store,
    LoadBorrow,
    BeginBorrow,
    EndBorrow,
    /// Operands: value, destination address.
    Assign,
    /// Operands: value, destination address.
    StoreBorrow,
    MarkUninitialized,
    MarkFunctionEscape,
    /// Operands: source address, destination address.
    CopyAddr,
    DestroyAddr,
    /// Operands: base address, index.
    IndexAddr,
    /// Operands: base address, element count.
    TailAddr,
    BeginAccess { access: String },
    EndAccess,
    /// Operands: address, access buffer.
    BeginUnpairedAccess { access: String },
    EndUnpairedAccess,

    // Reference counting
    StrongRetain,
    StrongRelease,
    RetainValue,
    ReleaseValue,
    StrongPin,
    StrongUnpin,
    EndLifetime,
    /// Operands: value, base.
    MarkDependence,

    // Literals
    FunctionRef { function: String },
    GlobalAddr { global: String },
    IntegerLiteral { value: i64 },
    FloatLiteral { value: f64 },
    StringLiteral { value: String },
    ConstStringLiteral { value: String },

    // Dynamic dispatch; operand 0 is the receiver (or lookup type).
    ClassMethod { member: String },
    ObjCMethod { member: String },
    SuperMethod { member: String },
    WitnessMethod { member: String },

    // Function application; operand 0 is the callee, the rest are arguments.
    Apply,
    BeginApply,
    /// Operands: the begin_apply token.
    EndApply,
    /// Operands: the begin_apply token.
    AbortApply,
    PartialApply,
    Builtin { name: String },

    // Metatypes
    Metatype,
    ValueMetatype,
    ExistentialMetatype,

    // Aggregate types
    CopyValue,
    DestroyValue,
    Tuple,
    TupleExtract { index: u32 },
    TupleElementAddr { index: u32 },
    Struct,
    StructExtract { field: String },
    StructElementAddr { field: String },
    RefElementAddr { field: String },
    RefTailAddr,

    // Enums
    Enum { case: String },
    UncheckedEnumData { case: String },
    InjectEnumAddr { case: String },
    InitEnumDataAddr { case: String },
    UncheckedTakeEnumDataAddr { case: String },
    /// Operands: the enum, one result per case, then the default result.
    SelectEnum { cases: Vec<String>, has_default: bool },
    /// Operands: the enum address, one result per case, then the default result.
    SelectEnumAddr { cases: Vec<String>, has_default: bool },

    // Protocol and protocol composition types
    InitExistentialAddr,
    DeinitExistentialAddr,
    InitExistentialValue,
    DeinitExistentialValue,
    OpenExistentialAddr,
    OpenExistentialValue,
    InitExistentialMetatype,
    OpenExistentialMetatype,
    InitExistentialRef,
    OpenExistentialRef,
    AllocExistentialBox,
    ProjectExistentialBox,
    OpenExistentialBox,
    OpenExistentialBoxValue,
    DeallocExistentialBox,

    // Unchecked conversions; the instruction type is the target type.
    Upcast,
    AddressToPointer,
    PointerToAddress,
    UncheckedRefCast,
    /// Operands: source address, destination address.
    UncheckedRefCastAddr,
    UncheckedAddrCast,
    UncheckedTrivialBitCast,
    UncheckedBitwiseCast,
    UncheckedOwnershipConversion,
    RefToRawPointer,
    RawPointerToRef,
    UnmanagedToRef,
    RefToUnmanaged,
    ConvertFunction,
    ThinFunctionToPointer,
    PointerToThinFunction,
    ClassifyBridgeObject,
    RefToBridgeObject,
    BridgeObjectToRef,
    ThinToThickFunction,
    ThickToObjCMetatype,
    ObjCToThickMetatype,

    // Checked conversions
    UnconditionalCheckedCast,
    /// Operands: source address, destination address.
    UnconditionalCheckedCastAddr,

    // Runtime failures
    CondFail { message: Option<String> },

    // Terminators
    Unreachable,
    Return,
    Throw,
    /// Operands: the yielded values.
    Yield { resume: BlockId, unwind: BlockId },
    Unwind,
    /// Operands: the destination block arguments.
    Branch { dest: BlockId },
    /// Operands: condition, `true_args` true-edge arguments, then the false-edge arguments.
    CondBranch { true_dest: BlockId, false_dest: BlockId, true_args: u32 },
    /// Operands: the switched value, then one case value per entry of `cases`.
    SwitchValue { cases: Vec<BlockId>, default: Option<BlockId> },
    /// Operands: the switched value, then (case value, result) pairs, then the default result.
    SelectValue { case_count: u32, has_default: bool },
    SwitchEnum { cases: Vec<(String, BlockId)>, default: Option<BlockId> },
    SwitchEnumAddr { cases: Vec<(String, BlockId)>, default: Option<BlockId> },
    CheckedCastBranch { target: String, success: BlockId, failure: BlockId },
    /// Operands: source address, destination address.
    CheckedCastAddrBranch { target: String, success: BlockId, failure: BlockId },
    TryApply { normal: BlockId, error: BlockId },

    /// Any instruction outside the closed set, kept by name.
    Unknown { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Allocation,
    DebugInfo,
    MemoryAccess,
    ReferenceCounting,
    Literal,
    DynamicDispatch,
    FunctionApplication,
    Metatype,
    Aggregate,
    Enum,
    Existential,
    UncheckedConversion,
    CheckedConversion,
    RuntimeFailure,
    Terminator,
    Unknown,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Allocation => "allocation",
            Category::DebugInfo => "debug-info",
            Category::MemoryAccess => "memory",
            Category::ReferenceCounting => "refcount",
            Category::Literal => "literal",
            Category::DynamicDispatch => "dispatch",
            Category::FunctionApplication => "apply",
            Category::Metatype => "metatype",
            Category::Aggregate => "aggregate",
            Category::Enum => "enum",
            Category::Existential => "existential",
            Category::UncheckedConversion => "unchecked-cast",
            Category::CheckedConversion => "checked-cast",
            Category::RuntimeFailure => "runtime-failure",
            Category::Terminator => "terminator",
            Category::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryBehavior {
    None,
    MayRead,
    MayWrite,
    MayReadWrite,
    MayHaveSideEffects,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleasingBehavior {
    DoesNotRelease,
    MayRelease,
}

impl InstKind {
    /// The textual op name used by module documents and dumps.
    pub fn name(&self) -> &str {
        use InstKind::*;
        match self {
            AllocStack { .. } => "alloc_stack",
            AllocBox { .. } => "alloc_box",
            AllocRef => "alloc_ref",
            AllocValueBuffer => "alloc_value_buffer",
            AllocGlobal { .. } => "alloc_global",
            ProjectBox { .. } => "project_box",
            ProjectValueBuffer => "project_value_buffer",
            DeallocStack => "dealloc_stack",
            DeallocBox => "dealloc_box",
            DeallocRef => "dealloc_ref",
            DeallocValueBuffer => "dealloc_value_buffer",
            DebugValue { .. } => "debug_value",
            DebugValueAddr { .. } => "debug_value_addr",
            Load => "load",
            Store => "store",
            LoadBorrow => "load_borrow",
            BeginBorrow => "begin_borrow",
            EndBorrow => "end_borrow",
            Assign => "assign",
            StoreBorrow => "store_borrow",
            MarkUninitialized => "mark_uninitialized",
            MarkFunctionEscape => "mark_function_escape",
            CopyAddr => "copy_addr",
            DestroyAddr => "destroy_addr",
            IndexAddr => "index_addr",
            TailAddr => "tail_addr",
            BeginAccess { .. } => "begin_access",
            EndAccess => "end_access",
            BeginUnpairedAccess { .. } => "begin_unpaired_access",
            EndUnpairedAccess => "end_unpaired_access",
            StrongRetain => "strong_retain",
            StrongRelease => "strong_release",
            RetainValue => "retain_value",
            ReleaseValue => "release_value",
            StrongPin => "strong_pin",
            StrongUnpin => "strong_unpin",
            EndLifetime => "end_lifetime",
            MarkDependence => "mark_dependence",
            FunctionRef { .. } => "function_ref",
            GlobalAddr { .. } => "global_addr",
            IntegerLiteral { .. } => "integer_literal",
            FloatLiteral { .. } => "float_literal",
            StringLiteral { .. } => "string_literal",
            ConstStringLiteral { .. } => "const_string_literal",
            ClassMethod { .. } => "class_method",
            ObjCMethod { .. } => "objc_method",
            SuperMethod { .. } => "super_method",
            WitnessMethod { .. } => "witness_method",
            Apply => "apply",
            BeginApply => "begin_apply",
            EndApply => "end_apply",
            AbortApply => "abort_apply",
            PartialApply => "partial_apply",
            Builtin { .. } => "builtin",
            Metatype => "metatype",
            ValueMetatype => "value_metatype",
            ExistentialMetatype => "existential_metatype",
            CopyValue => "copy_value",
            DestroyValue => "destroy_value",
            Tuple => "tuple",
            TupleExtract { .. } => "tuple_extract",
            TupleElementAddr { .. } => "tuple_element_addr",
            Struct => "struct",
            StructExtract { .. } => "struct_extract",
            StructElementAddr { .. } => "struct_element_addr",
            RefElementAddr { .. } => "ref_element_addr",
            RefTailAddr => "ref_tail_addr",
            Enum { .. } => "enum",
            UncheckedEnumData { .. } => "unchecked_enum_data",
            InjectEnumAddr { .. } => "inject_enum_addr",
            InitEnumDataAddr { .. } => "init_enum_data_addr",
            UncheckedTakeEnumDataAddr { .. } => "unchecked_take_enum_data_addr",
            SelectEnum { .. } => "select_enum",
            SelectEnumAddr { .. } => "select_enum_addr",
            InitExistentialAddr => "init_existential_addr",
            DeinitExistentialAddr => "deinit_existential_addr",
            InitExistentialValue => "init_existential_value",
            DeinitExistentialValue => "deinit_existential_value",
            OpenExistentialAddr => "open_existential_addr",
            OpenExistentialValue => "open_existential_value",
            InitExistentialMetatype => "init_existential_metatype",
            OpenExistentialMetatype => "open_existential_metatype",
            InitExistentialRef => "init_existential_ref",
            OpenExistentialRef => "open_existential_ref",
            AllocExistentialBox => "alloc_existential_box",
            ProjectExistentialBox => "project_existential_box",
            OpenExistentialBox => "open_existential_box",
            OpenExistentialBoxValue => "open_existential_box_value",
            DeallocExistentialBox => "dealloc_existential_box",
            Upcast => "upcast",
            AddressToPointer => "address_to_pointer",
            PointerToAddress => "pointer_to_address",
            UncheckedRefCast => "unchecked_ref_cast",
            UncheckedRefCastAddr => "unchecked_ref_cast_addr",
            UncheckedAddrCast => "unchecked_addr_cast",
            UncheckedTrivialBitCast => "unchecked_trivial_bit_cast",
            UncheckedBitwiseCast => "unchecked_bitwise_cast",
            UncheckedOwnershipConversion => "unchecked_ownership_conversion",
            RefToRawPointer => "ref_to_raw_pointer",
            RawPointerToRef => "raw_pointer_to_ref",
            UnmanagedToRef => "unmanaged_to_ref",
            RefToUnmanaged => "ref_to_unmanaged",
            ConvertFunction => "convert_function",
            ThinFunctionToPointer => "thin_function_to_pointer",
            PointerToThinFunction => "pointer_to_thin_function",
            ClassifyBridgeObject => "classify_bridge_object",
            RefToBridgeObject => "ref_to_bridge_object",
            BridgeObjectToRef => "bridge_object_to_ref",
            ThinToThickFunction => "thin_to_thick_function",
            ThickToObjCMetatype => "thick_to_objc_metatype",
            ObjCToThickMetatype => "objc_to_thick_metatype",
            UnconditionalCheckedCast => "unconditional_checked_cast",
            UnconditionalCheckedCastAddr => "unconditional_checked_cast_addr",
            CondFail { .. } => "cond_fail",
            Unreachable => "unreachable",
            Return => "return",
            Throw => "throw",
            Yield { .. } => "yield",
            Unwind => "unwind",
            Branch { .. } => "br",
            CondBranch { .. } => "cond_br",
            SwitchValue { .. } => "switch_value",
            SelectValue { .. } => "select_value",
            SwitchEnum { .. } => "switch_enum",
            SwitchEnumAddr { .. } => "switch_enum_addr",
            CheckedCastBranch { .. } => "checked_cast_br",
            CheckedCastAddrBranch { .. } => "checked_cast_addr_br",
            TryApply { .. } => "try_apply",
            Unknown { name } => name.as_str(),
        }
    }

    pub fn category(&self) -> Category {
        use InstKind::*;
        match self {
            AllocStack { .. } | AllocBox { .. } | AllocRef | AllocValueBuffer | AllocGlobal { .. }
            | ProjectBox { .. } | ProjectValueBuffer | DeallocStack | DeallocBox | DeallocRef
            | DeallocValueBuffer => Category::Allocation,
            DebugValue { .. } | DebugValueAddr { .. } => Category::DebugInfo,
            Load | Store | LoadBorrow | BeginBorrow | EndBorrow | Assign | StoreBorrow
            | MarkUninitialized | MarkFunctionEscape | CopyAddr | DestroyAddr | IndexAddr
            | TailAddr | BeginAccess { .. } | EndAccess | BeginUnpairedAccess { .. }
            | EndUnpairedAccess => Category::MemoryAccess,
            StrongRetain | StrongRelease | RetainValue | ReleaseValue | StrongPin | StrongUnpin
            | EndLifetime | MarkDependence => Category::ReferenceCounting,
            FunctionRef { .. } | GlobalAddr { .. } | IntegerLiteral { .. } | FloatLiteral { .. }
            | StringLiteral { .. } | ConstStringLiteral { .. } => Category::Literal,
            ClassMethod { .. } | ObjCMethod { .. } | SuperMethod { .. } | WitnessMethod { .. } => {
                Category::DynamicDispatch
            }
            Apply | BeginApply | EndApply | AbortApply | PartialApply | Builtin { .. } => {
                Category::FunctionApplication
            }
            Metatype | ValueMetatype | ExistentialMetatype => Category::Metatype,
            CopyValue | DestroyValue | Tuple | TupleExtract { .. } | TupleElementAddr { .. }
            | Struct | StructExtract { .. } | StructElementAddr { .. } | RefElementAddr { .. }
            | RefTailAddr => Category::Aggregate,
            Enum { .. } | UncheckedEnumData { .. } | InjectEnumAddr { .. } | InitEnumDataAddr { .. }
            | UncheckedTakeEnumDataAddr { .. } | SelectEnum { .. } | SelectEnumAddr { .. } => {
                Category::Enum
            }
            InitExistentialAddr | DeinitExistentialAddr | InitExistentialValue
            | DeinitExistentialValue | OpenExistentialAddr | OpenExistentialValue
            | InitExistentialMetatype | OpenExistentialMetatype | InitExistentialRef
            | OpenExistentialRef | AllocExistentialBox | ProjectExistentialBox
            | OpenExistentialBox | OpenExistentialBoxValue | DeallocExistentialBox => {
                Category::Existential
            }
            Upcast | AddressToPointer | PointerToAddress | UncheckedRefCast | UncheckedRefCastAddr
            | UncheckedAddrCast | UncheckedTrivialBitCast | UncheckedBitwiseCast
            | UncheckedOwnershipConversion | RefToRawPointer | RawPointerToRef | UnmanagedToRef
            | RefToUnmanaged | ConvertFunction | ThinFunctionToPointer | PointerToThinFunction
            | ClassifyBridgeObject | RefToBridgeObject | BridgeObjectToRef | ThinToThickFunction
            | ThickToObjCMetatype | ObjCToThickMetatype => Category::UncheckedConversion,
            UnconditionalCheckedCast | UnconditionalCheckedCastAddr => Category::CheckedConversion,
            CondFail { .. } => Category::RuntimeFailure,
            Unreachable | Return | Throw | Yield { .. } | Unwind | Branch { .. }
            | CondBranch { .. } | SwitchValue { .. } | SelectValue { .. } | SwitchEnum { .. }
            | SwitchEnumAddr { .. } | CheckedCastBranch { .. } | CheckedCastAddrBranch { .. }
            | TryApply { .. } => Category::Terminator,
            Unknown { .. } => Category::Unknown,
        }
    }

    /// True for instructions that end a basic block. `select_value` is grouped
    /// with the terminators but produces a value and does not end its block.
    pub fn is_terminator(&self) -> bool {
        !matches!(self, InstKind::SelectValue { .. })
            && self.category() == Category::Terminator
    }

    /// Successor blocks in source order.
    pub fn successors(&self) -> Vec<BlockId> {
        use InstKind::*;
        match self {
            Yield { resume, unwind } => vec![*resume, *unwind],
            Branch { dest } => vec![*dest],
            CondBranch { true_dest, false_dest, .. } => vec![*true_dest, *false_dest],
            SwitchValue { cases, default } => {
                cases.iter().copied().chain(default.iter().copied()).collect()
            }
            SwitchEnum { cases, default } | SwitchEnumAddr { cases, default } => cases
                .iter()
                .map(|(_, b)| *b)
                .chain(default.iter().copied())
                .collect(),
            CheckedCastBranch { success, failure, .. }
            | CheckedCastAddrBranch { success, failure, .. } => vec![*success, *failure],
            TryApply { normal, error } => vec![*normal, *error],
            _ => Vec::new(),
        }
    }

    pub fn memory_behavior(&self) -> MemoryBehavior {
        use InstKind::*;
        match self {
            Load | LoadBorrow | SelectEnumAddr { .. } | SwitchEnumAddr { .. } | ValueMetatype
            | ExistentialMetatype | OpenExistentialAddr | OpenExistentialBox => {
                MemoryBehavior::MayRead
            }
            Store | Assign | StoreBorrow | InjectEnumAddr { .. } | InitExistentialAddr
            | DeinitExistentialAddr => MemoryBehavior::MayWrite,
            CopyAddr | UncheckedTakeEnumDataAddr { .. } | UnconditionalCheckedCastAddr
            | UncheckedRefCastAddr => MemoryBehavior::MayReadWrite,
            AllocStack { .. } | AllocBox { .. } | AllocRef | AllocValueBuffer | AllocGlobal { .. }
            | AllocExistentialBox | DeallocStack | DeallocBox | DeallocRef | DeallocValueBuffer
            | DeallocExistentialBox | DestroyAddr | DestroyValue | StrongRetain | StrongRelease
            | RetainValue | ReleaseValue | StrongPin | StrongUnpin | Apply | BeginApply
            | EndApply | AbortApply | PartialApply | Builtin { .. } | BeginAccess { .. }
            | EndAccess | BeginUnpairedAccess { .. } | EndUnpairedAccess | CondFail { .. }
            | Throw | Yield { .. } | TryApply { .. } | CheckedCastAddrBranch { .. }
            | MarkFunctionEscape | Unknown { .. } => MemoryBehavior::MayHaveSideEffects,
            _ => MemoryBehavior::None,
        }
    }

    pub fn releasing_behavior(&self) -> ReleasingBehavior {
        use InstKind::*;
        match self {
            Apply | BeginApply | EndApply | AbortApply | PartialApply | TryApply { .. }
            | Builtin { .. } | DestroyAddr | DestroyValue | StrongRelease | ReleaseValue
            | StrongUnpin | DeallocRef | CopyAddr | Assign | UnconditionalCheckedCastAddr
            | CheckedCastAddrBranch { .. } | Unknown { .. } => ReleasingBehavior::MayRelease,
            _ => ReleasingBehavior::DoesNotRelease,
        }
    }
}

impl fmt::Display for InstKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
