//! Builtin-name to operator table.
//!
//! Builtin names carry a type suffix (`add_Int64`, `cmp_slt_Int1`). Lookup
//! matches the longest operator prefix that is followed by `_` or ends the
//! name; anything else is lowered as a call.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinOp {
    Binary(&'static str),
    Unary(&'static str),
}

lazy_static::lazy_static! {
    static ref BUILTIN_OPERATORS: Vec<(&'static str, BuiltinOp)> = {
        use BuiltinOp::*;
        let mut table = vec![
            ("add", Binary("+")),
            ("fadd", Binary("+")),
            ("sadd_with_overflow", Binary("+")),
            ("uadd_with_overflow", Binary("+")),
            ("sub", Binary("-")),
            ("fsub", Binary("-")),
            ("ssub_with_overflow", Binary("-")),
            ("usub_with_overflow", Binary("-")),
            ("mul", Binary("*")),
            ("fmul", Binary("*")),
            ("smul_with_overflow", Binary("*")),
            ("umul_with_overflow", Binary("*")),
            ("sdiv", Binary("/")),
            ("udiv", Binary("/")),
            ("fdiv", Binary("/")),
            ("exactsdiv", Binary("/")),
            ("exactudiv", Binary("/")),
            ("srem", Binary("%")),
            ("urem", Binary("%")),
            ("frem", Binary("%")),
            ("and", Binary("&")),
            ("or", Binary("|")),
            ("xor", Binary("^")),
            ("shl", Binary("<<")),
            ("ashr", Binary(">>")),
            ("lshr", Binary(">>>")),
            ("cmp_eq", Binary("==")),
            ("cmp_ne", Binary("!=")),
            ("cmp_slt", Binary("<")),
            ("cmp_sle", Binary("<=")),
            ("cmp_sgt", Binary(">")),
            ("cmp_sge", Binary(">=")),
            ("cmp_ult", Binary("<")),
            ("cmp_ule", Binary("<=")),
            ("cmp_ugt", Binary(">")),
            ("cmp_uge", Binary(">=")),
            ("fcmp_oeq", Binary("==")),
            ("fcmp_one", Binary("!=")),
            ("fcmp_olt", Binary("<")),
            ("fcmp_ole", Binary("<=")),
            ("fcmp_ogt", Binary(">")),
            ("fcmp_oge", Binary(">=")),
            ("fcmp_ueq", Binary("==")),
            ("fcmp_une", Binary("!=")),
            ("fcmp_ult", Binary("<")),
            ("fcmp_ule", Binary("<=")),
            ("fcmp_ugt", Binary(">")),
            ("fcmp_uge", Binary(">=")),
            ("neg", Unary("-")),
            ("fneg", Unary("-")),
            ("not", Unary("!")),
        ];
        table.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        table
    };
}

/// The operator a builtin lowers to, if it has one.
pub fn builtin_operator(name: &str) -> Option<BuiltinOp> {
    BUILTIN_OPERATORS.iter().find_map(|(prefix, op)| {
        let rest = name.strip_prefix(prefix)?;
        if rest.is_empty() || rest.starts_with('_') {
            Some(*op)
        } else {
            None
        }
    })
}
