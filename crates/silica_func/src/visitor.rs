//! Visitor dispatch over functional IR nodes.

use crate::ir::Node;
use silica_common::{Ident, LogicVec};

/// One handler method per functional IR operation.
///
/// [`Node::visit`] dispatches each node to exactly one of these methods,
/// passing the node itself, its argument nodes, and any constant, name,
/// or integer payload. This is the sole type-casing mechanism over the
/// graph: the match in `visit` is exhaustive, so adding an operation
/// forces every visitor to be extended.
///
/// `Multiple` nodes have no handler; they must be resolved away before
/// the graph is consumed and `visit` panics on them.
pub trait Visitor<'a> {
    /// The result of visiting one node.
    type Output;

    /// `buf(a)`: a filled placeholder forwarding `a`.
    fn buf(&mut self, node: Node<'a>, a: Node<'a>) -> Self::Output;
    /// `a[offset +: out_width]`
    fn slice(&mut self, node: Node<'a>, a: Node<'a>, offset: u32, out_width: u32) -> Self::Output;
    /// `a` zero extended to `out_width`.
    fn zero_extend(&mut self, node: Node<'a>, a: Node<'a>, out_width: u32) -> Self::Output;
    /// `a` sign extended to `out_width`.
    fn sign_extend(&mut self, node: Node<'a>, a: Node<'a>, out_width: u32) -> Self::Output;
    /// `{b, a}` with `a` least significant.
    fn concat(&mut self, node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output;
    /// `a + b`
    fn add(&mut self, node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output;
    /// `a - b`
    fn sub(&mut self, node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output;
    /// `a * b`
    fn mul(&mut self, node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output;
    /// `a / b`, unsigned.
    fn unsigned_div(&mut self, node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output;
    /// `a % b`, unsigned.
    fn unsigned_mod(&mut self, node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output;
    /// `a & b`
    fn bitwise_and(&mut self, node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output;
    /// `a | b`
    fn bitwise_or(&mut self, node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output;
    /// `a ^ b`
    fn bitwise_xor(&mut self, node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output;
    /// `~a`
    fn bitwise_not(&mut self, node: Node<'a>, a: Node<'a>) -> Self::Output;
    /// `&a`
    fn reduce_and(&mut self, node: Node<'a>, a: Node<'a>) -> Self::Output;
    /// `|a`
    fn reduce_or(&mut self, node: Node<'a>, a: Node<'a>) -> Self::Output;
    /// `^a`
    fn reduce_xor(&mut self, node: Node<'a>, a: Node<'a>) -> Self::Output;
    /// `-a`
    fn unary_minus(&mut self, node: Node<'a>, a: Node<'a>) -> Self::Output;
    /// `a == b`
    fn equal(&mut self, node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output;
    /// `a != b`
    fn not_equal(&mut self, node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output;
    /// `a > b`, signed.
    fn signed_greater_than(&mut self, node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output;
    /// `a >= b`, signed.
    fn signed_greater_equal(&mut self, node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output;
    /// `a > b`, unsigned.
    fn unsigned_greater_than(&mut self, node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output;
    /// `a >= b`, unsigned.
    fn unsigned_greater_equal(&mut self, node: Node<'a>, a: Node<'a>, b: Node<'a>)
        -> Self::Output;
    /// `a << b`
    fn logical_shift_left(&mut self, node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output;
    /// `a >> b`, zero filling.
    fn logical_shift_right(&mut self, node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output;
    /// `a >> b`, sign filling.
    fn arithmetic_shift_right(&mut self, node: Node<'a>, a: Node<'a>, b: Node<'a>)
        -> Self::Output;
    /// `s ? b : a`
    fn mux(&mut self, node: Node<'a>, a: Node<'a>, b: Node<'a>, s: Node<'a>) -> Self::Output;
    /// A constant value.
    fn constant(&mut self, node: Node<'a>, value: &'a LogicVec) -> Self::Output;
    /// The current value of the named input.
    fn input(&mut self, node: Node<'a>, name: Ident) -> Self::Output;
    /// The current value of the named state variable.
    fn state(&mut self, node: Node<'a>, name: Ident) -> Self::Output;
    /// `mem[addr]`
    fn memory_read(&mut self, node: Node<'a>, mem: Node<'a>, addr: Node<'a>) -> Self::Output;
    /// A copy of `mem` with `addr` changed to `data`.
    fn memory_write(
        &mut self,
        node: Node<'a>,
        mem: Node<'a>,
        addr: Node<'a>,
        data: Node<'a>,
    ) -> Self::Output;
    /// An undriven value of the given width.
    fn undriven(&mut self, node: Node<'a>, width: u32) -> Self::Output;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::FunctionalIr;
    use silica_common::Interner;

    /// Counts operation names seen, checking dispatch reaches the right
    /// handler with the right payload.
    struct OpNamer;

    impl<'a> Visitor<'a> for OpNamer {
        type Output = String;

        fn buf(&mut self, _: Node<'a>, _: Node<'a>) -> String {
            "buf".into()
        }
        fn slice(&mut self, _: Node<'a>, _: Node<'a>, offset: u32, out_width: u32) -> String {
            format!("slice[{offset}+:{out_width}]")
        }
        fn zero_extend(&mut self, _: Node<'a>, _: Node<'a>, w: u32) -> String {
            format!("zext[{w}]")
        }
        fn sign_extend(&mut self, _: Node<'a>, _: Node<'a>, w: u32) -> String {
            format!("sext[{w}]")
        }
        fn concat(&mut self, _: Node<'a>, _: Node<'a>, _: Node<'a>) -> String {
            "concat".into()
        }
        fn add(&mut self, _: Node<'a>, _: Node<'a>, _: Node<'a>) -> String {
            "add".into()
        }
        fn sub(&mut self, _: Node<'a>, _: Node<'a>, _: Node<'a>) -> String {
            "sub".into()
        }
        fn mul(&mut self, _: Node<'a>, _: Node<'a>, _: Node<'a>) -> String {
            "mul".into()
        }
        fn unsigned_div(&mut self, _: Node<'a>, _: Node<'a>, _: Node<'a>) -> String {
            "udiv".into()
        }
        fn unsigned_mod(&mut self, _: Node<'a>, _: Node<'a>, _: Node<'a>) -> String {
            "umod".into()
        }
        fn bitwise_and(&mut self, _: Node<'a>, _: Node<'a>, _: Node<'a>) -> String {
            "and".into()
        }
        fn bitwise_or(&mut self, _: Node<'a>, _: Node<'a>, _: Node<'a>) -> String {
            "or".into()
        }
        fn bitwise_xor(&mut self, _: Node<'a>, _: Node<'a>, _: Node<'a>) -> String {
            "xor".into()
        }
        fn bitwise_not(&mut self, _: Node<'a>, _: Node<'a>) -> String {
            "not".into()
        }
        fn reduce_and(&mut self, _: Node<'a>, _: Node<'a>) -> String {
            "rand".into()
        }
        fn reduce_or(&mut self, _: Node<'a>, _: Node<'a>) -> String {
            "ror".into()
        }
        fn reduce_xor(&mut self, _: Node<'a>, _: Node<'a>) -> String {
            "rxor".into()
        }
        fn unary_minus(&mut self, _: Node<'a>, _: Node<'a>) -> String {
            "neg".into()
        }
        fn equal(&mut self, _: Node<'a>, _: Node<'a>, _: Node<'a>) -> String {
            "eq".into()
        }
        fn not_equal(&mut self, _: Node<'a>, _: Node<'a>, _: Node<'a>) -> String {
            "ne".into()
        }
        fn signed_greater_than(&mut self, _: Node<'a>, _: Node<'a>, _: Node<'a>) -> String {
            "sgt".into()
        }
        fn signed_greater_equal(&mut self, _: Node<'a>, _: Node<'a>, _: Node<'a>) -> String {
            "sge".into()
        }
        fn unsigned_greater_than(&mut self, _: Node<'a>, _: Node<'a>, _: Node<'a>) -> String {
            "ugt".into()
        }
        fn unsigned_greater_equal(&mut self, _: Node<'a>, _: Node<'a>, _: Node<'a>) -> String {
            "uge".into()
        }
        fn logical_shift_left(&mut self, _: Node<'a>, _: Node<'a>, _: Node<'a>) -> String {
            "shl".into()
        }
        fn logical_shift_right(&mut self, _: Node<'a>, _: Node<'a>, _: Node<'a>) -> String {
            "shr".into()
        }
        fn arithmetic_shift_right(&mut self, _: Node<'a>, _: Node<'a>, _: Node<'a>) -> String {
            "asr".into()
        }
        fn mux(&mut self, _: Node<'a>, _: Node<'a>, _: Node<'a>, _: Node<'a>) -> String {
            "mux".into()
        }
        fn constant(&mut self, _: Node<'a>, value: &'a LogicVec) -> String {
            format!("const[{value}]")
        }
        fn input(&mut self, _: Node<'a>, _: Ident) -> String {
            "input".into()
        }
        fn state(&mut self, _: Node<'a>, _: Ident) -> String {
            "state".into()
        }
        fn memory_read(&mut self, _: Node<'a>, _: Node<'a>, _: Node<'a>) -> String {
            "mrd".into()
        }
        fn memory_write(&mut self, _: Node<'a>, _: Node<'a>, _: Node<'a>, _: Node<'a>) -> String {
            "mwr".into()
        }
        fn undriven(&mut self, _: Node<'a>, w: u32) -> String {
            format!("undriven[{w}]")
        }
    }

    #[test]
    fn dispatch_reaches_matching_handler() {
        let interner = Interner::new();
        let mut ir = FunctionalIr::new();
        let mut f = ir.factory();
        let a = f.input(interner.intern_id("a"), 8);
        let b = f.input(interner.intern_id("b"), 8);
        let sum = f.add(a, b);
        let sliced = f.slice(sum, 2, 4);
        let k = f.constant(LogicVec::from_u64(0b1010, 4));

        let mut v = OpNamer;
        assert_eq!(ir.node(a).visit(&mut v), "input");
        assert_eq!(ir.node(sum).visit(&mut v), "add");
        assert_eq!(ir.node(sliced).visit(&mut v), "slice[2+:4]");
        assert_eq!(ir.node(k).visit(&mut v), "const[1010]");
    }

    #[test]
    #[should_panic(expected = "multiple node in visit")]
    fn multiple_is_rejected_in_visit() {
        let interner = Interner::new();
        let mut ir = FunctionalIr::new();
        let mut f = ir.factory();
        let a = f.input(interner.intern_id("a"), 1);
        let b = f.input(interner.intern_id("b"), 1);
        let m = f.multiple(&[a, b], 1);
        ir.node(m).visit(&mut OpNamer);
    }
}
