//! The functional IR proper: operation set, node views, and the factory.

use crate::graph::{ComputeGraph, NodeId};
use crate::sort::{ceil_log2, Sort};
use crate::visitor::Visitor;
use serde::{Deserialize, Serialize};
use silica_common::{Ident, Interner, LogicVec};
use std::collections::BTreeMap;

/// The operation of a functional IR node, with its non-node payload.
///
/// Each operation is documented with a pseudocode signature. The types
/// used are `bit[N]` (a bitvector of N bits, signed or unsigned per the
/// operation) and `memory[N, M]` (N address bits, M data bits).
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum NodeData {
    /// `buf(a: any): any = a`. Placeholder nodes are created as `buf`
    /// with no arguments and filled in exactly once later.
    Buf,
    /// `slice(a: bit[in_width]): bit[out_width] = a[offset +: out_width]`.
    /// The output width is the node's sort.
    Slice {
        /// Bit offset of the slice within the input.
        offset: u32,
    },
    /// `zero_extend(a: unsigned bit[in_width]): unsigned bit[out_width]`,
    /// `out_width > in_width`.
    ZeroExtend,
    /// `sign_extend(a: signed bit[in_width]): signed bit[out_width]`,
    /// `out_width > in_width`.
    SignExtend,
    /// `concat(a: bit[N], b: bit[M]): bit[N+M]` with `a` in the least
    /// significant position.
    Concat,
    /// `add(a: bit[N], b: bit[N]): bit[N] = a + b`
    Add,
    /// `sub(a: bit[N], b: bit[N]): bit[N] = a - b`
    Sub,
    /// `mul(a: bit[N], b: bit[N]): bit[N] = a * b`
    Mul,
    /// `unsigned_div(a: unsigned bit[N], b: unsigned bit[N]): bit[N] = a / b`
    UnsignedDiv,
    /// `unsigned_mod(a: unsigned bit[N], b: unsigned bit[N]): bit[N] = a % b`
    UnsignedMod,
    /// `bitwise_and(a: bit[N], b: bit[N]): bit[N] = a & b`
    BitwiseAnd,
    /// `bitwise_or(a: bit[N], b: bit[N]): bit[N] = a | b`
    BitwiseOr,
    /// `bitwise_xor(a: bit[N], b: bit[N]): bit[N] = a ^ b`
    BitwiseXor,
    /// `bitwise_not(a: bit[N]): bit[N] = ~a`
    BitwiseNot,
    /// `reduce_and(a: bit[N]): bit[1] = &a`
    ReduceAnd,
    /// `reduce_or(a: bit[N]): bit[1] = |a`
    ReduceOr,
    /// `reduce_xor(a: bit[N]): bit[1] = ^a`
    ReduceXor,
    /// `unary_minus(a: bit[N]): bit[N] = -a`
    UnaryMinus,
    /// `equal(a: bit[N], b: bit[N]): bit[1] = (a == b)`
    Equal,
    /// `not_equal(a: bit[N], b: bit[N]): bit[1] = (a != b)`
    NotEqual,
    /// `signed_greater_than(a: signed bit[N], b: signed bit[N]): bit[1]`
    SignedGreaterThan,
    /// `signed_greater_equal(a: signed bit[N], b: signed bit[N]): bit[1]`
    SignedGreaterEqual,
    /// `unsigned_greater_than(a: unsigned bit[N], b: unsigned bit[N]): bit[1]`
    UnsignedGreaterThan,
    /// `unsigned_greater_equal(a: unsigned bit[N], b: unsigned bit[N]): bit[1]`
    UnsignedGreaterEqual,
    /// `logical_shift_left(a: bit[N], b: unsigned bit[clog2(N)]): bit[N]`
    LogicalShiftLeft,
    /// `logical_shift_right(a: unsigned bit[N], b: unsigned bit[clog2(N)]): bit[N]`
    LogicalShiftRight,
    /// `arithmetic_shift_right(a: signed bit[N], b: unsigned bit[clog2(N)]): bit[N]`
    ArithmeticShiftRight,
    /// `mux(a: bit[N], b: bit[N], s: bit[1]): bit[N] = s ? b : a`
    Mux,
    /// `constant(value): bit[N]` where N is the value's width.
    Constant(LogicVec),
    /// The current value of the named input.
    Input(Ident),
    /// The current value of the named state variable.
    State(Ident),
    /// A value driven by multiple sources. Built incrementally, never
    /// deduplicated, and rejected by visitors.
    Multiple,
    /// `undriven(): bit[width]`, an undriven value.
    Undriven,
    /// `memory_read(memory: memory[A, D], addr: bit[A]): bit[D]`
    MemoryRead,
    /// `memory_write(memory: memory[A, D], addr: bit[A], data: bit[D]):
    /// memory[A, D]`, a copy of `memory` with `addr` changed to `data`.
    MemoryWrite,
}

impl NodeData {
    /// Returns the operation name as a string literal.
    pub fn name(&self) -> &'static str {
        match self {
            NodeData::Buf => "buf",
            NodeData::Slice { .. } => "slice",
            NodeData::ZeroExtend => "zero_extend",
            NodeData::SignExtend => "sign_extend",
            NodeData::Concat => "concat",
            NodeData::Add => "add",
            NodeData::Sub => "sub",
            NodeData::Mul => "mul",
            NodeData::UnsignedDiv => "unsigned_div",
            NodeData::UnsignedMod => "unsigned_mod",
            NodeData::BitwiseAnd => "bitwise_and",
            NodeData::BitwiseOr => "bitwise_or",
            NodeData::BitwiseXor => "bitwise_xor",
            NodeData::BitwiseNot => "bitwise_not",
            NodeData::ReduceAnd => "reduce_and",
            NodeData::ReduceOr => "reduce_or",
            NodeData::ReduceXor => "reduce_xor",
            NodeData::UnaryMinus => "unary_minus",
            NodeData::Equal => "equal",
            NodeData::NotEqual => "not_equal",
            NodeData::SignedGreaterThan => "signed_greater_than",
            NodeData::SignedGreaterEqual => "signed_greater_equal",
            NodeData::UnsignedGreaterThan => "unsigned_greater_than",
            NodeData::UnsignedGreaterEqual => "unsigned_greater_equal",
            NodeData::LogicalShiftLeft => "logical_shift_left",
            NodeData::LogicalShiftRight => "logical_shift_right",
            NodeData::ArithmeticShiftRight => "arithmetic_shift_right",
            NodeData::Mux => "mux",
            NodeData::Constant(_) => "constant",
            NodeData::Input(_) => "input",
            NodeData::State(_) => "state",
            NodeData::Multiple => "multiple",
            NodeData::Undriven => "undriven",
            NodeData::MemoryRead => "memory_read",
            NodeData::MemoryWrite => "memory_write",
        }
    }
}

/// Key identifying an addressable port node: an output value or a
/// next-state value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct PortKey {
    /// The declared name.
    pub name: Ident,
    /// `true` for next-state values, `false` for outputs.
    pub next_state: bool,
}

/// The functional IR of one module.
///
/// Nodes are created through [`FunctionalIr::factory`]; the graph is
/// append-only apart from the placeholder and multi-driver lifecycle
/// documented on [`Factory`].
pub struct FunctionalIr {
    graph: ComputeGraph<NodeData, Sort, Ident, PortKey>,
    inputs: BTreeMap<Ident, Sort>,
    outputs: BTreeMap<Ident, Sort>,
    state: BTreeMap<Ident, Sort>,
}

impl FunctionalIr {
    /// Creates an empty IR.
    pub fn new() -> Self {
        Self {
            graph: ComputeGraph::new(),
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
            state: BTreeMap::new(),
        }
    }

    /// Returns a factory for adding nodes to this IR.
    pub fn factory(&mut self) -> Factory<'_> {
        Factory { ir: self }
    }

    /// Returns the number of nodes.
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    /// Returns `true` if the IR has no nodes.
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Returns a view of the node with the given id.
    pub fn node(&self, id: NodeId) -> Node<'_> {
        assert!(id.index() < self.graph.len(), "node id out of range");
        Node { ir: self, id }
    }

    /// Iterates over all nodes in id order.
    pub fn iter(&self) -> impl Iterator<Item = Node<'_>> {
        (0..self.graph.len()).map(|index| Node {
            ir: self,
            id: NodeId::from_index(index),
        })
    }

    /// The sort of a node.
    pub fn sort(&self, id: NodeId) -> Sort {
        *self.graph.attr(id)
    }

    /// The declared inputs, name to sort.
    pub fn inputs(&self) -> &BTreeMap<Ident, Sort> {
        &self.inputs
    }

    /// The declared outputs, name to sort.
    pub fn outputs(&self) -> &BTreeMap<Ident, Sort> {
        &self.outputs
    }

    /// The declared state variables, name to sort.
    pub fn state(&self) -> &BTreeMap<Ident, Sort> {
        &self.state
    }

    /// The node declared as the value of the named output.
    pub fn output_node(&self, name: Ident) -> Option<Node<'_>> {
        self.graph
            .key_node(&PortKey {
                name,
                next_state: false,
            })
            .map(|id| self.node(id))
    }

    /// The node declared as the next value of the named state variable.
    pub fn state_next_node(&self, name: Ident) -> Option<Node<'_>> {
        self.graph
            .key_node(&PortKey {
                name,
                next_state: true,
            })
            .map(|id| self.node(id))
    }

    /// Replaces every reference to a filled placeholder with a direct
    /// reference to its argument, collapsing chains transitively.
    pub fn forward_buf(&mut self) {
        self.graph.bypass(|data, args| {
            if *data == NodeData::Buf && args.len() == 1 {
                Some(args[0])
            } else {
                None
            }
        });
    }

    /// Renumbers the nodes so every node's arguments precede it.
    ///
    /// Invalidates previously obtained [`NodeId`]s.
    pub fn topological_sort(&mut self) {
        self.graph.topological_sort();
    }

    fn add_input(&mut self, name: Ident, sort: Sort) {
        let existing = self.inputs.entry(name).or_insert(sort);
        assert!(*existing == sort, "input redeclared with a different sort");
    }

    fn add_output(&mut self, name: Ident, sort: Sort) {
        let existing = self.outputs.entry(name).or_insert(sort);
        assert!(*existing == sort, "output redeclared with a different sort");
    }

    fn add_state(&mut self, name: Ident, sort: Sort) {
        let existing = self.state.entry(name).or_insert(sort);
        assert!(*existing == sort, "state redeclared with a different sort");
    }
}

impl Default for FunctionalIr {
    fn default() -> Self {
        Self::new()
    }
}

/// An immutable view of one functional IR node.
#[derive(Clone, Copy)]
pub struct Node<'a> {
    ir: &'a FunctionalIr,
    id: NodeId,
}

impl<'a> Node<'a> {
    /// The node's id. May change if the graph is re-sorted.
    pub fn id(self) -> NodeId {
        self.id
    }

    /// The node's operation and payload.
    pub fn data(self) -> &'a NodeData {
        self.ir.graph.function(self.id)
    }

    /// The node's sort.
    pub fn sort(self) -> Sort {
        self.ir.sort(self.id)
    }

    /// The width of a bitvector node.
    ///
    /// # Panics
    ///
    /// Panics for memory nodes.
    pub fn width(self) -> u32 {
        self.sort().width()
    }

    /// Number of node arguments.
    pub fn arg_count(self) -> usize {
        self.ir.graph.args(self.id).len()
    }

    /// The `n`th argument node.
    pub fn arg(self, n: usize) -> Node<'a> {
        self.ir.node(self.ir.graph.args(self.id)[n])
    }

    /// A name suggestion for the node, which need not be unique.
    ///
    /// Falls back to `$<id>` for nodes without a suggestion.
    pub fn name(self, interner: &Interner) -> String {
        match self.ir.graph.sparse_attr(self.id) {
            Some(&ident) => interner.resolve(ident).to_string(),
            None => format!("${}", self.id.index()),
        }
    }

    /// Dispatches to the visitor method matching this node's operation.
    ///
    /// This is the sole mechanism for interpreting the graph; consumers
    /// never match on [`NodeData`] directly.
    ///
    /// # Panics
    ///
    /// Panics on [`NodeData::Multiple`] nodes, which must be resolved
    /// before the graph is consumed, and on unfilled placeholders.
    pub fn visit<V: Visitor<'a>>(self, visitor: &mut V) -> V::Output {
        match self.data() {
            NodeData::Buf => {
                assert!(self.arg_count() == 1, "unfilled placeholder in visit");
                visitor.buf(self, self.arg(0))
            }
            NodeData::Slice { offset } => {
                visitor.slice(self, self.arg(0), *offset, self.width())
            }
            NodeData::ZeroExtend => visitor.zero_extend(self, self.arg(0), self.width()),
            NodeData::SignExtend => visitor.sign_extend(self, self.arg(0), self.width()),
            NodeData::Concat => visitor.concat(self, self.arg(0), self.arg(1)),
            NodeData::Add => visitor.add(self, self.arg(0), self.arg(1)),
            NodeData::Sub => visitor.sub(self, self.arg(0), self.arg(1)),
            NodeData::Mul => visitor.mul(self, self.arg(0), self.arg(1)),
            NodeData::UnsignedDiv => visitor.unsigned_div(self, self.arg(0), self.arg(1)),
            NodeData::UnsignedMod => visitor.unsigned_mod(self, self.arg(0), self.arg(1)),
            NodeData::BitwiseAnd => visitor.bitwise_and(self, self.arg(0), self.arg(1)),
            NodeData::BitwiseOr => visitor.bitwise_or(self, self.arg(0), self.arg(1)),
            NodeData::BitwiseXor => visitor.bitwise_xor(self, self.arg(0), self.arg(1)),
            NodeData::BitwiseNot => visitor.bitwise_not(self, self.arg(0)),
            NodeData::ReduceAnd => visitor.reduce_and(self, self.arg(0)),
            NodeData::ReduceOr => visitor.reduce_or(self, self.arg(0)),
            NodeData::ReduceXor => visitor.reduce_xor(self, self.arg(0)),
            NodeData::UnaryMinus => visitor.unary_minus(self, self.arg(0)),
            NodeData::Equal => visitor.equal(self, self.arg(0), self.arg(1)),
            NodeData::NotEqual => visitor.not_equal(self, self.arg(0), self.arg(1)),
            NodeData::SignedGreaterThan => {
                visitor.signed_greater_than(self, self.arg(0), self.arg(1))
            }
            NodeData::SignedGreaterEqual => {
                visitor.signed_greater_equal(self, self.arg(0), self.arg(1))
            }
            NodeData::UnsignedGreaterThan => {
                visitor.unsigned_greater_than(self, self.arg(0), self.arg(1))
            }
            NodeData::UnsignedGreaterEqual => {
                visitor.unsigned_greater_equal(self, self.arg(0), self.arg(1))
            }
            NodeData::LogicalShiftLeft => {
                visitor.logical_shift_left(self, self.arg(0), self.arg(1))
            }
            NodeData::LogicalShiftRight => {
                visitor.logical_shift_right(self, self.arg(0), self.arg(1))
            }
            NodeData::ArithmeticShiftRight => {
                visitor.arithmetic_shift_right(self, self.arg(0), self.arg(1))
            }
            NodeData::Mux => visitor.mux(self, self.arg(0), self.arg(1), self.arg(2)),
            NodeData::Constant(value) => visitor.constant(self, value),
            NodeData::Input(name) => visitor.input(self, *name),
            NodeData::State(name) => visitor.state(self, *name),
            NodeData::Multiple => panic!("multiple node in visit"),
            NodeData::Undriven => visitor.undriven(self, self.width()),
            NodeData::MemoryRead => visitor.memory_read(self, self.arg(0), self.arg(1)),
            NodeData::MemoryWrite => {
                visitor.memory_write(self, self.arg(0), self.arg(1), self.arg(2))
            }
        }
    }
}

/// Builder for functional IR nodes.
///
/// Every constructor validates its operands' sorts before adding a node;
/// a violated precondition is a bug in the producer and panics. Trivial
/// identities are simplified at construction time: a full-width slice,
/// a same-width extend, and a reduction of a width-1 operand all return
/// the operand unchanged.
pub struct Factory<'a> {
    ir: &'a mut FunctionalIr,
}

impl Factory<'_> {
    fn push(&mut self, data: NodeData, sort: Sort, args: &[NodeId]) -> NodeId {
        match sort {
            Sort::Signal(width) => assert!(width > 0, "node width must be positive"),
            Sort::Memory {
                addr_width,
                data_width,
            } => assert!(
                addr_width > 0 && data_width > 0,
                "memory shape must be positive"
            ),
        }
        self.ir.graph.add(data, sort, args.to_vec())
    }

    fn sort(&self, node: NodeId) -> Sort {
        self.ir.sort(node)
    }

    fn check_basic_binary(&self, a: NodeId, b: NodeId) {
        let sort = self.sort(a);
        assert!(
            sort.is_signal() && sort == self.sort(b),
            "binary operands must be signals of equal width"
        );
    }

    fn check_shift(&self, a: NodeId, b: NodeId) {
        let (a, b) = (self.sort(a), self.sort(b));
        assert!(
            a.is_signal() && b.is_signal() && b.width() == ceil_log2(a.width()),
            "shift amount width must be clog2 of the operand width"
        );
    }

    fn check_unary(&self, a: NodeId) {
        assert!(self.sort(a).is_signal(), "unary operand must be a signal");
    }

    /// `a[offset +: out_width]`. A full-width slice returns `a` itself.
    pub fn slice(&mut self, a: NodeId, offset: u32, out_width: u32) -> NodeId {
        let sort = self.sort(a);
        assert!(
            sort.is_signal() && offset + out_width <= sort.width(),
            "slice out of range"
        );
        if offset == 0 && out_width == sort.width() {
            return a;
        }
        self.push(NodeData::Slice { offset }, Sort::Signal(out_width), &[a])
    }

    /// Extends or truncates `a` to `out_width`. A same-width extend is a
    /// no-op; narrowing routes to [`slice`](Self::slice).
    pub fn extend(&mut self, a: NodeId, out_width: u32, is_signed: bool) -> NodeId {
        let sort = self.sort(a);
        assert!(sort.is_signal(), "extend operand must be a signal");
        let in_width = sort.width();
        if in_width == out_width {
            return a;
        }
        if in_width > out_width {
            return self.slice(a, 0, out_width);
        }
        let data = if is_signed {
            NodeData::SignExtend
        } else {
            NodeData::ZeroExtend
        };
        self.push(data, Sort::Signal(out_width), &[a])
    }

    /// `{b, a}`: concatenation with `a` least significant.
    pub fn concat(&mut self, a: NodeId, b: NodeId) -> NodeId {
        let (sa, sb) = (self.sort(a), self.sort(b));
        assert!(
            sa.is_signal() && sb.is_signal(),
            "concat operands must be signals"
        );
        self.push(
            NodeData::Concat,
            Sort::Signal(sa.width() + sb.width()),
            &[a, b],
        )
    }

    /// `a + b`
    pub fn add(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.check_basic_binary(a, b);
        self.push(NodeData::Add, self.sort(a), &[a, b])
    }

    /// `a - b`
    pub fn sub(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.check_basic_binary(a, b);
        self.push(NodeData::Sub, self.sort(a), &[a, b])
    }

    /// `a * b`
    pub fn mul(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.check_basic_binary(a, b);
        self.push(NodeData::Mul, self.sort(a), &[a, b])
    }

    /// `a / b`, unsigned.
    pub fn unsigned_div(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.check_basic_binary(a, b);
        self.push(NodeData::UnsignedDiv, self.sort(a), &[a, b])
    }

    /// `a % b`, unsigned.
    pub fn unsigned_mod(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.check_basic_binary(a, b);
        self.push(NodeData::UnsignedMod, self.sort(a), &[a, b])
    }

    /// `a & b`
    pub fn bitwise_and(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.check_basic_binary(a, b);
        self.push(NodeData::BitwiseAnd, self.sort(a), &[a, b])
    }

    /// `a | b`
    pub fn bitwise_or(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.check_basic_binary(a, b);
        self.push(NodeData::BitwiseOr, self.sort(a), &[a, b])
    }

    /// `a ^ b`
    pub fn bitwise_xor(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.check_basic_binary(a, b);
        self.push(NodeData::BitwiseXor, self.sort(a), &[a, b])
    }

    /// `~a`
    pub fn bitwise_not(&mut self, a: NodeId) -> NodeId {
        self.check_unary(a);
        self.push(NodeData::BitwiseNot, self.sort(a), &[a])
    }

    /// `-a`
    pub fn unary_minus(&mut self, a: NodeId) -> NodeId {
        self.check_unary(a);
        self.push(NodeData::UnaryMinus, self.sort(a), &[a])
    }

    /// `&a`. A width-1 operand is returned unchanged.
    pub fn reduce_and(&mut self, a: NodeId) -> NodeId {
        self.check_unary(a);
        if self.sort(a).width() == 1 {
            return a;
        }
        self.push(NodeData::ReduceAnd, Sort::Signal(1), &[a])
    }

    /// `|a`. A width-1 operand is returned unchanged.
    pub fn reduce_or(&mut self, a: NodeId) -> NodeId {
        self.check_unary(a);
        if self.sort(a).width() == 1 {
            return a;
        }
        self.push(NodeData::ReduceOr, Sort::Signal(1), &[a])
    }

    /// `^a`. A width-1 operand is returned unchanged.
    pub fn reduce_xor(&mut self, a: NodeId) -> NodeId {
        self.check_unary(a);
        if self.sort(a).width() == 1 {
            return a;
        }
        self.push(NodeData::ReduceXor, Sort::Signal(1), &[a])
    }

    /// `a == b`
    pub fn equal(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.check_basic_binary(a, b);
        self.push(NodeData::Equal, Sort::Signal(1), &[a, b])
    }

    /// `a != b`
    pub fn not_equal(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.check_basic_binary(a, b);
        self.push(NodeData::NotEqual, Sort::Signal(1), &[a, b])
    }

    /// `a > b`, signed.
    pub fn signed_greater_than(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.check_basic_binary(a, b);
        self.push(NodeData::SignedGreaterThan, Sort::Signal(1), &[a, b])
    }

    /// `a >= b`, signed.
    pub fn signed_greater_equal(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.check_basic_binary(a, b);
        self.push(NodeData::SignedGreaterEqual, Sort::Signal(1), &[a, b])
    }

    /// `a > b`, unsigned.
    pub fn unsigned_greater_than(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.check_basic_binary(a, b);
        self.push(NodeData::UnsignedGreaterThan, Sort::Signal(1), &[a, b])
    }

    /// `a >= b`, unsigned.
    pub fn unsigned_greater_equal(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.check_basic_binary(a, b);
        self.push(NodeData::UnsignedGreaterEqual, Sort::Signal(1), &[a, b])
    }

    /// `a << b`
    pub fn logical_shift_left(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.check_shift(a, b);
        self.push(NodeData::LogicalShiftLeft, self.sort(a), &[a, b])
    }

    /// `a >> b`, zero filling.
    pub fn logical_shift_right(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.check_shift(a, b);
        self.push(NodeData::LogicalShiftRight, self.sort(a), &[a, b])
    }

    /// `a >> b`, sign filling.
    pub fn arithmetic_shift_right(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.check_shift(a, b);
        self.push(NodeData::ArithmeticShiftRight, self.sort(a), &[a, b])
    }

    /// `s ? b : a`
    pub fn mux(&mut self, a: NodeId, b: NodeId, s: NodeId) -> NodeId {
        let sort = self.sort(a);
        assert!(
            sort.is_signal() && sort == self.sort(b) && self.sort(s) == Sort::Signal(1),
            "mux operands must share a sort and the select must be one bit"
        );
        self.push(NodeData::Mux, sort, &[a, b, s])
    }

    /// `memory[addr]`
    pub fn memory_read(&mut self, mem: NodeId, addr: NodeId) -> NodeId {
        let (ms, asort) = (self.sort(mem), self.sort(addr));
        assert!(
            ms.is_memory() && asort.is_signal() && ms.addr_width() == asort.width(),
            "memory_read address width must match the memory"
        );
        self.push(
            NodeData::MemoryRead,
            Sort::Signal(ms.data_width()),
            &[mem, addr],
        )
    }

    /// A copy of `mem` with the value at `addr` changed to `data`.
    pub fn memory_write(&mut self, mem: NodeId, addr: NodeId, data: NodeId) -> NodeId {
        let (ms, asort, dsort) = (self.sort(mem), self.sort(addr), self.sort(data));
        assert!(
            ms.is_memory()
                && asort.is_signal()
                && dsort.is_signal()
                && ms.addr_width() == asort.width()
                && ms.data_width() == dsort.width(),
            "memory_write address and data widths must match the memory"
        );
        self.push(NodeData::MemoryWrite, ms, &[mem, addr, data])
    }

    /// A constant node with the value's width.
    pub fn constant(&mut self, value: LogicVec) -> NodeId {
        let width = value.width();
        self.push(NodeData::Constant(value), Sort::Signal(width), &[])
    }

    /// Allocates an unfilled placeholder of the given width.
    ///
    /// The placeholder lets a consumer reference a value before its
    /// defining expression has been built. Its single argument is
    /// supplied later by exactly one [`update_pending`](Self::update_pending)
    /// call.
    pub fn create_pending(&mut self, width: u32) -> NodeId {
        assert!(width > 0, "node width must be positive");
        self.ir.graph.add_open(NodeData::Buf, Sort::Signal(width))
    }

    /// Fills a placeholder with its value and seals it.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not an unfilled placeholder, including when
    /// it has already been filled once.
    pub fn update_pending(&mut self, node: NodeId, value: NodeId) {
        assert!(
            *self.ir.graph.function(node) == NodeData::Buf
                && !self.ir.graph.is_sealed(node)
                && self.ir.graph.args(node).is_empty(),
            "update_pending target must be an unfilled placeholder"
        );
        assert!(
            self.sort(node) == self.sort(value),
            "placeholder and value sorts must match"
        );
        self.ir.graph.append_arg(node, value);
        self.ir.graph.seal(node);
    }

    /// The current value of the named input, declaring it.
    pub fn input(&mut self, name: Ident, width: u32) -> NodeId {
        self.ir.add_input(name, Sort::Signal(width));
        self.push(NodeData::Input(name), Sort::Signal(width), &[])
    }

    /// The current value of the named state variable, declaring it.
    pub fn state(&mut self, name: Ident, width: u32) -> NodeId {
        self.ir.add_state(name, Sort::Signal(width));
        self.push(NodeData::State(name), Sort::Signal(width), &[])
    }

    /// The current contents of the named state memory, declaring it.
    pub fn state_memory(&mut self, name: Ident, addr_width: u32, data_width: u32) -> NodeId {
        let sort = Sort::Memory {
            addr_width,
            data_width,
        };
        self.ir.add_state(name, sort);
        self.push(NodeData::State(name), sort, &[])
    }

    /// A value driven by multiple sources.
    pub fn multiple(&mut self, args: &[NodeId], width: u32) -> NodeId {
        assert!(width > 0, "node width must be positive");
        let node = self.ir.graph.add_open(NodeData::Multiple, Sort::Signal(width));
        for &arg in args {
            self.ir.graph.append_arg(node, arg);
        }
        self.ir.graph.seal(node);
        node
    }

    /// An undriven value.
    pub fn undriven(&mut self, width: u32) -> NodeId {
        self.push(NodeData::Undriven, Sort::Signal(width), &[])
    }

    /// Declares `node` as the value of the named output.
    pub fn declare_output(&mut self, node: NodeId, name: Ident, width: u32) {
        self.ir.add_output(name, Sort::Signal(width));
        self.ir.graph.assign_key(
            PortKey {
                name,
                next_state: false,
            },
            node,
        );
    }

    /// Declares `node` as the next value of the named state variable.
    pub fn declare_state(&mut self, node: NodeId, name: Ident, width: u32) {
        self.ir.add_state(name, Sort::Signal(width));
        self.ir.graph.assign_key(
            PortKey {
                name,
                next_state: true,
            },
            node,
        );
    }

    /// Declares `node` as the next contents of the named state memory.
    pub fn declare_state_memory(
        &mut self,
        node: NodeId,
        name: Ident,
        addr_width: u32,
        data_width: u32,
    ) {
        self.ir.add_state(
            name,
            Sort::Memory {
                addr_width,
                data_width,
            },
        );
        self.ir.graph.assign_key(
            PortKey {
                name,
                next_state: true,
            },
            node,
        );
    }

    /// Attaches a naming suggestion to a node.
    pub fn suggest_name(&mut self, node: NodeId, name: Ident) {
        self.ir.graph.set_sparse_attr(node, name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn const_node(factory: &mut Factory, value: u64, width: u32) -> NodeId {
        factory.constant(LogicVec::from_u64(value, width))
    }

    #[test]
    fn hash_consing_shares_identical_nodes() {
        let mut ir = FunctionalIr::new();
        let mut f = ir.factory();
        let a = const_node(&mut f, 3, 8);
        let b = const_node(&mut f, 5, 8);
        let sum1 = f.add(a, b);
        let sum2 = f.add(a, b);
        assert_eq!(sum1, sum2);
        let swapped = f.add(b, a);
        assert_ne!(sum1, swapped);
    }

    #[test]
    #[should_panic(expected = "equal width")]
    fn add_of_mismatched_widths_panics() {
        let mut ir = FunctionalIr::new();
        let mut f = ir.factory();
        let a = const_node(&mut f, 1, 4);
        let b = const_node(&mut f, 1, 8);
        f.add(a, b);
    }

    #[test]
    fn full_width_slice_is_identity() {
        let mut ir = FunctionalIr::new();
        let mut f = ir.factory();
        let a = const_node(&mut f, 0xff, 8);
        assert_eq!(f.slice(a, 0, 8), a);
        let partial = f.slice(a, 2, 4);
        assert_ne!(partial, a);
        assert_eq!(ir.sort(partial), Sort::Signal(4));
    }

    #[test]
    fn extend_routes_narrowing_to_slice() {
        let mut ir = FunctionalIr::new();
        let mut f = ir.factory();
        let a = const_node(&mut f, 0xff, 8);
        assert_eq!(f.extend(a, 8, false), a);
        let narrowed = f.extend(a, 4, false);
        assert_eq!(*ir.node(narrowed).data(), NodeData::Slice { offset: 0 });
        let mut f = ir.factory();
        let widened = f.extend(a, 16, true);
        assert_eq!(*ir.node(widened).data(), NodeData::SignExtend);
        assert_eq!(ir.sort(widened), Sort::Signal(16));
    }

    #[test]
    fn width_one_reduction_is_identity() {
        let mut ir = FunctionalIr::new();
        let mut f = ir.factory();
        let bit = const_node(&mut f, 1, 1);
        assert_eq!(f.reduce_and(bit), bit);
        assert_eq!(f.reduce_or(bit), bit);
        assert_eq!(f.reduce_xor(bit), bit);
        let wide = const_node(&mut f, 3, 4);
        let reduced = f.reduce_xor(wide);
        assert_eq!(ir.sort(reduced), Sort::Signal(1));
    }

    #[test]
    fn mux_requires_matching_sorts() {
        let mut ir = FunctionalIr::new();
        let mut f = ir.factory();
        let a = const_node(&mut f, 1, 8);
        let b = const_node(&mut f, 2, 8);
        let s = const_node(&mut f, 1, 1);
        let m = f.mux(a, b, s);
        assert_eq!(ir.sort(m), Sort::Signal(8));
    }

    #[test]
    #[should_panic(expected = "mux operands")]
    fn mux_of_mismatched_widths_panics() {
        let mut ir = FunctionalIr::new();
        let mut f = ir.factory();
        let a = const_node(&mut f, 1, 8);
        let b = const_node(&mut f, 2, 4);
        let s = const_node(&mut f, 1, 1);
        f.mux(a, b, s);
    }

    #[test]
    fn placeholder_fills_once() {
        let mut ir = FunctionalIr::new();
        let mut f = ir.factory();
        let pending = f.create_pending(8);
        let value = const_node(&mut f, 0x42, 8);
        f.update_pending(pending, value);
        assert_eq!(ir.node(pending).arg(0).id(), value);
    }

    #[test]
    #[should_panic(expected = "unfilled placeholder")]
    fn placeholder_double_fill_panics() {
        let mut ir = FunctionalIr::new();
        let mut f = ir.factory();
        let pending = f.create_pending(8);
        let value = const_node(&mut f, 1, 8);
        f.update_pending(pending, value);
        f.update_pending(pending, value);
    }

    #[test]
    fn placeholders_are_not_deduplicated() {
        let mut ir = FunctionalIr::new();
        let mut f = ir.factory();
        let p1 = f.create_pending(8);
        let p2 = f.create_pending(8);
        assert_ne!(p1, p2);
    }

    #[test]
    fn forward_buf_bypasses_placeholders() {
        let interner = Interner::new();
        let mut ir = FunctionalIr::new();
        let mut f = ir.factory();
        let pending = f.create_pending(8);
        let inverted = f.bitwise_not(pending);
        let input = f.input(interner.intern_id("a"), 8);
        f.update_pending(pending, input);
        f.declare_output(inverted, interner.intern_id("y"), 8);

        ir.forward_buf();
        let out = ir.output_node(interner.intern_id("y")).unwrap();
        assert_eq!(out.arg(0).id(), input);
    }

    #[test]
    fn declared_ports_resolve_to_last_declaration() {
        let interner = Interner::new();
        let name = interner.intern_id("q");
        let mut ir = FunctionalIr::new();
        let mut f = ir.factory();
        let state = f.state(name, 4);
        let one = const_node(&mut f, 1, 4);
        let next = f.add(state, one);
        f.declare_state(next, name, 4);

        assert_eq!(ir.state_next_node(name).unwrap().id(), next);
        assert!(ir.output_node(name).is_none());
        assert_eq!(ir.state()[&name], Sort::Signal(4));
    }

    #[test]
    #[should_panic(expected = "different sort")]
    fn interface_redeclaration_must_match() {
        let interner = Interner::new();
        let name = interner.intern_id("a");
        let mut ir = FunctionalIr::new();
        let mut f = ir.factory();
        f.input(name, 8);
        f.input(name, 4);
    }

    #[test]
    fn name_suggestion_and_fallback() {
        let interner = Interner::new();
        let mut ir = FunctionalIr::new();
        let mut f = ir.factory();
        let a = const_node(&mut f, 1, 1);
        let b = const_node(&mut f, 0, 1);
        f.suggest_name(a, interner.intern_id("carry"));
        assert_eq!(ir.node(a).name(&interner), "\\carry");
        assert_eq!(ir.node(b).name(&interner), format!("${}", b.index()));
    }

    #[test]
    fn memory_ops_check_shapes() {
        let interner = Interner::new();
        let mut ir = FunctionalIr::new();
        let mut f = ir.factory();
        let mem = f.state_memory(interner.intern_id("ram"), 4, 16);
        let addr = const_node(&mut f, 3, 4);
        let data = const_node(&mut f, 0xbeef, 16);
        let written = f.memory_write(mem, addr, data);
        let read = f.memory_read(written, addr);
        assert_eq!(ir.sort(written), ir.sort(mem));
        assert_eq!(ir.sort(read), Sort::Signal(16));
    }

    #[test]
    #[should_panic(expected = "address width")]
    fn memory_read_wrong_addr_width_panics() {
        let interner = Interner::new();
        let mut ir = FunctionalIr::new();
        let mut f = ir.factory();
        let mem = f.state_memory(interner.intern_id("ram"), 4, 16);
        let addr = const_node(&mut f, 0, 8);
        f.memory_read(mem, addr);
    }
}
