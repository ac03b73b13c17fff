use serde::{Deserialize, Serialize};

use crate::model::{DeclTable, DeclId, Expr, IndexValue};

/// Bits per addressable unit.
pub const BITS_PER_UNIT: u64 = 8;

/// Object a memory reference is rooted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Base {
    /// Storage of a named declaration.
    Decl(DeclId),
    /// Memory reached through a computed address.
    Memory { read_only: bool },
}

/// A memory reference split into its base object and the bit range accessed
/// within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnerReference {
    pub base: Base,
    /// Constant part of the offset from the start of `base`, in bits.
    pub bit_position: i64,
    pub bit_size: u64,
    pub volatile: bool,
    /// Some component contributes an offset only known at run time.
    pub variable_offset: bool,
}

impl InnerReference {
    /// The access starts on a multiple of `size` bytes and covers exactly
    /// `size` bytes.
    pub fn is_naturally_aligned(&self, size: u64) -> bool {
        let Some(size_bits) = to_bits(size).filter(|bits| *bits > 0) else {
            return false;
        };
        let Ok(modulus) = i64::try_from(size_bits) else {
            return false;
        };
        self.bit_position.rem_euclid(modulus) == 0 && self.bit_size == size_bits
    }
}

/// Decompose `expr` into base + bit offset + bit size.
///
/// Returns `None` when `expr` is not a memory reference, the size of the
/// accessed component cannot be determined, or an offset does not fit in 64
/// bits.
pub fn inner_reference(expr: &Expr, decls: &DeclTable<'_>) -> Option<InnerReference> {
    let bit_size = match expr {
        Expr::Var { decl } => to_bits(decls.get(*decl)?.ty.positive_size()?)?,
        Expr::Field { bit_size, .. } => *bit_size,
        Expr::Index { ty, .. } | Expr::Deref { ty, .. } => to_bits(ty.positive_size()?)?,
        Expr::Ssa { .. } | Expr::Constant { .. } | Expr::AddressOf { .. } => return None,
    };
    let (base, bit_position, volatile, variable_offset) = locate(expr, decls)?;
    Some(InnerReference { base, bit_position, bit_size, volatile, variable_offset })
}

/// Base object of a reference and the position of the reference within it.
fn locate(expr: &Expr, decls: &DeclTable<'_>) -> Option<(Base, i64, bool, bool)> {
    match expr {
        Expr::Var { decl } => {
            let d = decls.get(*decl)?;
            Some((Base::Decl(*decl), 0, d.volatile, false))
        }
        Expr::Field { base, bit_offset, .. } => {
            let (base, pos, volatile, variable) = locate(base, decls)?;
            let pos = pos.checked_add(i64::try_from(*bit_offset).ok()?)?;
            Some((base, pos, volatile, variable))
        }
        Expr::Index { base, index, ty } => {
            let (base, pos, volatile, variable) = locate(base, decls)?;
            match (index, ty.positive_size()) {
                (IndexValue::Constant(i), Some(elem)) => {
                    let offset = i.checked_mul(to_bits(elem)?)?;
                    let pos = pos.checked_add(i64::try_from(offset).ok()?)?;
                    Some((base, pos, volatile, variable))
                }
                _ => Some((base, pos, volatile, true)),
            }
        }
        Expr::Deref { pointer, offset, read_only, volatile, .. } => {
            let offset_bits = offset.checked_mul(BITS_PER_UNIT as i64)?;
            // `*(&x + off)` is an access to `x` itself.
            if let Expr::AddressOf { target } = pointer.as_ref() {
                if let Some((base, pos, inner_volatile, variable)) = locate(target, decls) {
                    let pos = pos.checked_add(offset_bits)?;
                    return Some((base, pos, inner_volatile || *volatile, variable));
                }
            }
            Some((Base::Memory { read_only: *read_only }, offset_bits, *volatile, false))
        }
        Expr::Ssa { .. } | Expr::Constant { .. } | Expr::AddressOf { .. } => None,
    }
}

fn to_bits(bytes: u64) -> Option<u64> {
    bytes.checked_mul(BITS_PER_UNIT)
}
