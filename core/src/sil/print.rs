//! Textual listing of a `SilModule`, close to the upstream IR syntax.

use std::fmt;

use super::ids::{BlockId, FunctionId, ValueId};
use super::kind::InstKind;
use super::module::{Instruction, SilModule};

impl SilModule {
    /// The label a block is printed with: its own label, or `bbN` by
    /// position inside its function.
    pub fn block_label(&self, block: BlockId) -> String {
        let Some(data) = self.block(block) else {
            return block.to_string();
        };
        if let Some(label) = &data.label {
            return label.clone();
        }
        let pos = self
            .function(data.function)
            .and_then(|f| f.blocks.iter().position(|b| *b == block))
            .unwrap_or(block.index());
        format!("bb{}", pos)
    }

    /// `%N`, or `undef` for undefined values.
    pub fn value_label(&self, value: ValueId) -> String {
        match self.value(value) {
            Some(v) if matches!(v.origin, super::module::ValueOrigin::Undef) => "undef".to_string(),
            _ => value.to_string(),
        }
    }

    /// One line of listing for `inst`, without indentation or location.
    pub fn inst_text(&self, inst: &Instruction) -> String {
        let mut line = String::new();
        if !inst.results.is_empty() {
            let results: Vec<String> = inst.results.iter().map(|r| r.to_string()).collect();
            if results.len() == 1 {
                line.push_str(&results[0]);
            } else {
                line.push_str(&format!("({})", results.join(", ")));
            }
            line.push_str(" = ");
        }
        line.push_str(inst.kind.name());
        let payload = self.payload_text(&inst.kind);
        if !payload.is_empty() {
            line.push(' ');
            line.push_str(&payload);
        }
        if !inst.operands.is_empty() {
            let ops: Vec<String> = inst.operands.iter().map(|o| self.value_label(*o)).collect();
            line.push(' ');
            line.push_str(&ops.join(", "));
        }
        if let Some(ty) = &inst.ty {
            line.push_str(" : ");
            line.push_str(ty);
        }
        line
    }

    fn payload_text(&self, kind: &InstKind) -> String {
        use InstKind::*;
        let l = |b: &BlockId| self.block_label(*b);
        match kind {
            AllocStack { var_name: Some(v) } | AllocBox { var_name: Some(v) } => format!("[var {}]", v),
            AllocGlobal { global } | GlobalAddr { global } => format!("@{}", global),
            ProjectBox { field_index } => format!("#{}", field_index),
            DebugValue { var_name } | DebugValueAddr { var_name } => format!("[var {}]", var_name),
            BeginAccess { access } | BeginUnpairedAccess { access } => format!("[{}]", access),
            FunctionRef { function } => format!("@{}", function),
            IntegerLiteral { value } => value.to_string(),
            FloatLiteral { value } => value.to_string(),
            StringLiteral { value } | ConstStringLiteral { value } => format!("{:?}", value),
            ClassMethod { member } | ObjCMethod { member } | SuperMethod { member }
            | WitnessMethod { member } => format!("#{}", member),
            Builtin { name } => format!("{:?}", name),
            TupleExtract { index } | TupleElementAddr { index } => format!("#{}", index),
            StructExtract { field } | StructElementAddr { field } | RefElementAddr { field } => {
                format!("#{}", field)
            }
            Enum { case } | UncheckedEnumData { case } | InjectEnumAddr { case }
            | InitEnumDataAddr { case } | UncheckedTakeEnumDataAddr { case } => format!("#{}", case),
            SelectEnum { cases, has_default } | SelectEnumAddr { cases, has_default } => {
                let mut s: Vec<String> = cases.iter().map(|c| format!("case #{}", c)).collect();
                if *has_default {
                    s.push("default".to_string());
                }
                format!("[{}]", s.join(", "))
            }
            CondFail { message: Some(m) } => format!("{:?}", m),
            Yield { resume, unwind } => format!("resume {}, unwind {}", l(resume), l(unwind)),
            Branch { dest } => l(dest),
            CondBranch { true_dest, false_dest, true_args } => {
                format!("{}, {} [true args {}]", l(true_dest), l(false_dest), true_args)
            }
            SwitchValue { cases, default } => {
                let mut s: Vec<String> = cases.iter().map(l).collect();
                if let Some(d) = default {
                    s.push(format!("default {}", l(d)));
                }
                format!("[{}]", s.join(", "))
            }
            SelectValue { case_count, has_default } => {
                format!("[{} cases{}]", case_count, if *has_default { ", default" } else { "" })
            }
            SwitchEnum { cases, default } | SwitchEnumAddr { cases, default } => {
                let mut s: Vec<String> = cases.iter().map(|(c, b)| format!("case #{}: {}", c, l(b))).collect();
                if let Some(d) = default {
                    s.push(format!("default {}", l(d)));
                }
                format!("[{}]", s.join(", "))
            }
            CheckedCastBranch { target, success, failure }
            | CheckedCastAddrBranch { target, success, failure } => {
                format!("to {}, {}, {}", target, l(success), l(failure))
            }
            TryApply { normal, error } => format!("normal {}, error {}", l(normal), l(error)),
            _ => String::new(),
        }
    }

    fn fmt_function(&self, f: &mut fmt::Formatter<'_>, id: FunctionId) -> fmt::Result {
        let Some(func) = self.function(id) else {
            return Ok(());
        };
        writeln!(f, "sil @{} {{", func.name)?;
        for block in &func.blocks {
            let Some(data) = self.block(*block) else {
                continue;
            };
            let args: Vec<String> = data
                .args
                .iter()
                .map(|a| {
                    let ty = self.value(*a).map(|v| v.ty.as_str()).unwrap_or("?");
                    format!("{} : {}", a, ty)
                })
                .collect();
            if args.is_empty() {
                writeln!(f, "{}:", self.block_label(*block))?;
            } else {
                writeln!(f, "{}({}):", self.block_label(*block), args.join(", "))?;
            }
            for inst_id in &data.insts {
                let Some(inst) = self.inst(*inst_id) else {
                    continue;
                };
                match inst.loc.as_ref().and_then(|l| l.decode()) {
                    Some(loc) => writeln!(f, "  {}  // {}", self.inst_text(inst), loc)?,
                    None => writeln!(f, "  {}", self.inst_text(inst))?,
                }
            }
        }
        writeln!(f, "}}")
    }
}

impl fmt::Display for SilModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source_file {
            Some(src) => writeln!(f, "// module {} ({})", self.name, src)?,
            None => writeln!(f, "// module {}", self.name)?,
        }
        for id in self.function_ids() {
            writeln!(f)?;
            self.fmt_function(f, id)?;
        }
        Ok(())
    }
}
