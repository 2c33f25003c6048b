use super::ids::{BlockId, FunctionId, InstId, ValueId};
use super::kind::InstKind;
use crate::location::Location;

/// A raw debug location as carried by the source IR. It may be incomplete;
/// `decode` turns it into a `Location` only when it names a file and a line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DebugLoc {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl DebugLoc {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        DebugLoc { file: file.into(), line, column }
    }

    pub fn decode(&self) -> Option<Location> {
        if self.file.is_empty() || self.line == 0 {
            return None;
        }
        Some(Location::new(self.file.clone(), self.line as usize, self.column as usize))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueOrigin {
    Result { inst: InstId, index: u32 },
    BlockArg { block: BlockId, index: u32 },
    Undef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueData {
    pub ty: String,
    /// Source-level name, when the producer kept one.
    pub name: Option<String>,
    pub origin: ValueOrigin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub kind: InstKind,
    pub operands: Vec<ValueId>,
    pub results: Vec<ValueId>,
    pub ty: Option<String>,
    pub loc: Option<DebugLoc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SilBlock {
    pub function: FunctionId,
    pub label: Option<String>,
    pub args: Vec<ValueId>,
    pub insts: Vec<InstId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SilFunction {
    /// Mangled name.
    pub name: String,
    pub blocks: Vec<BlockId>,
}

/// A source-IR module. Functions, blocks, instructions and values live in
/// flat arenas owned by the module and are addressed by typed indices.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SilModule {
    pub name: String,
    pub source_file: Option<String>,
    pub(crate) functions: Vec<SilFunction>,
    pub(crate) blocks: Vec<SilBlock>,
    pub(crate) insts: Vec<Instruction>,
    pub(crate) values: Vec<ValueData>,
}

impl SilModule {
    pub fn new(name: impl Into<String>) -> Self {
        SilModule { name: name.into(), ..Default::default() }
    }

    pub fn function_ids(&self) -> impl Iterator<Item = FunctionId> + '_ {
        (0..self.functions.len()).map(FunctionId::from_index)
    }

    pub fn function(&self, id: FunctionId) -> Option<&SilFunction> {
        self.functions.get(id.index())
    }

    pub fn block(&self, id: BlockId) -> Option<&SilBlock> {
        self.blocks.get(id.index())
    }

    pub fn inst(&self, id: InstId) -> Option<&Instruction> {
        self.insts.get(id.index())
    }

    pub fn value(&self, id: ValueId) -> Option<&ValueData> {
        self.values.get(id.index())
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn inst_count(&self) -> usize {
        self.insts.len()
    }

    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// The instruction that defines `value`, if it is an instruction result.
    pub fn defining_inst(&self, value: ValueId) -> Option<&Instruction> {
        match self.value(value)?.origin {
            ValueOrigin::Result { inst, .. } => self.inst(inst),
            _ => None,
        }
    }

    /// The file used to name dumps: the recorded source file, or the module name.
    pub fn dump_stem(&self) -> String {
        let path = self.source_file.as_deref().unwrap_or(&self.name);
        let short = match path.find("swift-source/") {
            Some(idx) => &path[idx + "swift-source/".len()..],
            None => path,
        };
        short
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
            .collect()
    }
}
