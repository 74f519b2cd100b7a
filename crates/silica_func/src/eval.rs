//! 4-state logic evaluation of a functional IR graph.
//!
//! [`Evaluator`] is the reference consumer of the IR: it binds input and
//! state values, then computes any node's value through [`Visitor`]
//! dispatch with memoization. Unknown (`X`/`Z`) operand bits propagate
//! pessimistically: an arithmetic result is unknown from the first bit an
//! unknown operand bit can influence, a division by zero is all-unknown,
//! and a memory write through an unknown address clobbers the entire
//! memory.
//!
//! Multiplication, division, and ordered comparisons are evaluated
//! through 64-bit integers; operands wider than 64 bits yield an
//! all-unknown result for those operations.

use crate::graph::NodeId;
use crate::ir::{FunctionalIr, Node};
use crate::sort::Sort;
use crate::visitor::Visitor;
use silica_common::{Ident, Interner, Logic, LogicVec};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Errors raised while evaluating a graph.
#[derive(Debug, Error)]
pub enum EvalError {
    /// An `input` node was reached with no value bound for its name.
    #[error("no value bound for input `{0}'")]
    MissingInput(String),
    /// A `state` node was reached with no value bound for its name.
    #[error("no value bound for state variable `{0}'")]
    MissingState(String),
    /// No node was declared for the requested output name.
    #[error("no declared output `{0}'")]
    UndeclaredOutput(String),
    /// No node was declared as the next value of the requested state name.
    #[error("no declared next-state value `{0}'")]
    UndeclaredState(String),
}

/// The evaluated value of a node: a bitvector or a memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// A bitvector value.
    Signal(LogicVec),
    /// A memory value.
    Memory(MemContents),
}

impl Value {
    /// The sort this value inhabits.
    pub fn sort(&self) -> Sort {
        match self {
            Value::Signal(v) => Sort::Signal(v.width()),
            Value::Memory(m) => Sort::Memory {
                addr_width: m.addr_width(),
                data_width: m.data_width(),
            },
        }
    }

    /// The bitvector of a signal value.
    ///
    /// # Panics
    ///
    /// Panics for memory values.
    pub fn as_signal(&self) -> &LogicVec {
        match self {
            Value::Signal(v) => v,
            Value::Memory(_) => panic!("signal value expected, found a memory"),
        }
    }

    /// The contents of a memory value.
    ///
    /// # Panics
    ///
    /// Panics for signal values.
    pub fn as_memory(&self) -> &MemContents {
        match self {
            Value::Memory(m) => m,
            Value::Signal(_) => panic!("memory value expected, found a signal"),
        }
    }
}

/// Sparse memory contents.
///
/// Unwritten cells read as a shared default, initially all-`X`. A write
/// through an unknown address could land anywhere, so it resets the
/// contents to all-`X`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemContents {
    addr_width: u32,
    data_width: u32,
    cells: BTreeMap<u64, LogicVec>,
    default: LogicVec,
}

impl MemContents {
    /// Creates a memory with every cell all-`X`.
    pub fn new(addr_width: u32, data_width: u32) -> Self {
        Self {
            addr_width,
            data_width,
            cells: BTreeMap::new(),
            default: LogicVec::all_x(data_width),
        }
    }

    /// Number of address bits.
    pub fn addr_width(&self) -> u32 {
        self.addr_width
    }

    /// Number of data bits per cell.
    pub fn data_width(&self) -> u32 {
        self.data_width
    }

    /// Reads the cell at `addr`. An unknown address reads all-`X`.
    pub fn read(&self, addr: &LogicVec) -> LogicVec {
        assert!(addr.width() == self.addr_width, "memory address width mismatch");
        match addr.to_u64() {
            Some(index) => self.cells.get(&index).unwrap_or(&self.default).clone(),
            None => LogicVec::all_x(self.data_width),
        }
    }

    /// Writes `data` to the cell at `addr`.
    pub fn write(&mut self, addr: &LogicVec, data: LogicVec) {
        assert!(addr.width() == self.addr_width, "memory address width mismatch");
        assert!(data.width() == self.data_width, "memory data width mismatch");
        match addr.to_u64() {
            Some(index) => {
                self.cells.insert(index, data);
            }
            None => {
                self.cells.clear();
                self.default = LogicVec::all_x(self.data_width);
            }
        }
    }

    /// Sets the cell at a known address, for state initialization.
    pub fn set(&mut self, addr: u64, data: LogicVec) {
        assert!(data.width() == self.data_width, "memory data width mismatch");
        self.cells.insert(addr, data);
    }
}

/// Memoizing evaluator over one functional IR graph.
pub struct Evaluator<'a> {
    ir: &'a FunctionalIr,
    interner: &'a Interner,
    inputs: HashMap<Ident, Value>,
    state: HashMap<Ident, Value>,
    cache: HashMap<NodeId, Value>,
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator with no values bound.
    pub fn new(ir: &'a FunctionalIr, interner: &'a Interner) -> Self {
        Self {
            ir,
            interner,
            inputs: HashMap::new(),
            state: HashMap::new(),
            cache: HashMap::new(),
        }
    }

    /// Binds the value of an input.
    ///
    /// # Panics
    ///
    /// Panics if the input is declared with a different width.
    pub fn set_input(&mut self, name: Ident, value: LogicVec) {
        if let Some(&sort) = self.ir.inputs().get(&name) {
            assert!(sort == Sort::Signal(value.width()), "input width mismatch");
        }
        self.inputs.insert(name, Value::Signal(value));
        self.cache.clear();
    }

    /// Binds the current value of a state variable.
    ///
    /// # Panics
    ///
    /// Panics if the state variable is declared with a different sort.
    pub fn set_state(&mut self, name: Ident, value: Value) {
        if let Some(&sort) = self.ir.state().get(&name) {
            assert!(sort == value.sort(), "state sort mismatch");
        }
        self.state.insert(name, value);
        self.cache.clear();
    }

    /// Evaluates a node, memoized.
    pub fn eval(&mut self, node: Node<'a>) -> Result<Value, EvalError> {
        if let Some(value) = self.cache.get(&node.id()) {
            return Ok(value.clone());
        }
        let value = node.visit(self)?;
        assert!(value.sort() == node.sort(), "evaluated value has the wrong sort");
        self.cache.insert(node.id(), value.clone());
        Ok(value)
    }

    /// Evaluates the declared value of the named output.
    pub fn output(&mut self, name: Ident) -> Result<Value, EvalError> {
        let node = self
            .ir
            .output_node(name)
            .ok_or_else(|| EvalError::UndeclaredOutput(self.interner.display(name).to_string()))?;
        self.eval(node)
    }

    /// Evaluates the declared next value of the named state variable.
    pub fn state_next(&mut self, name: Ident) -> Result<Value, EvalError> {
        let node = self
            .ir
            .state_next_node(name)
            .ok_or_else(|| EvalError::UndeclaredState(self.interner.display(name).to_string()))?;
        self.eval(node)
    }

    fn sig(&mut self, node: Node<'a>) -> Result<LogicVec, EvalError> {
        match self.eval(node)? {
            Value::Signal(v) => Ok(v),
            Value::Memory(_) => panic!("signal operand expected, found a memory"),
        }
    }

    fn mem(&mut self, node: Node<'a>) -> Result<MemContents, EvalError> {
        match self.eval(node)? {
            Value::Memory(m) => Ok(m),
            Value::Signal(_) => panic!("memory operand expected, found a signal"),
        }
    }
}

/// Adds bit by bit with X-propagation: the result is unknown from the
/// first position where an operand bit or the running carry is unknown.
fn ripple_add(a: &LogicVec, b: &LogicVec, carry_in: Logic) -> LogicVec {
    let width = a.width();
    let mut out = LogicVec::new(width);
    let mut carry = carry_in;
    for i in 0..width {
        let (x, y) = (a.get(i), b.get(i));
        if x.is_unknown() || y.is_unknown() || carry.is_unknown() {
            for j in i..width {
                out.set(j, Logic::X);
            }
            return out;
        }
        let (x, y, c) = (x == Logic::One, y == Logic::One, carry == Logic::One);
        out.set(i, Logic::from(x ^ y ^ c));
        carry = Logic::from((x && y) || (c && (x ^ y)));
    }
    out
}

/// Applies a 64-bit integer operation; unknown operands, operands wider
/// than 64 bits, or `None` from the operation yield all-`X`.
fn arith_u64<F>(a: &LogicVec, b: &LogicVec, op: F) -> LogicVec
where
    F: FnOnce(u64, u64) -> Option<u64>,
{
    let width = a.width();
    if width > 64 {
        return LogicVec::all_x(width);
    }
    match (a.to_u64(), b.to_u64()) {
        (Some(x), Some(y)) => match op(x, y) {
            Some(result) => LogicVec::from_u64(result, width),
            None => LogicVec::all_x(width),
        },
        _ => LogicVec::all_x(width),
    }
}

fn compare_bit(result: Option<bool>) -> LogicVec {
    match result {
        Some(value) => LogicVec::from_bool(value),
        None => LogicVec::all_x(1),
    }
}

fn unsigned_compare<F: FnOnce(u64, u64) -> bool>(a: &LogicVec, b: &LogicVec, op: F) -> LogicVec {
    if a.width() > 64 {
        return LogicVec::all_x(1);
    }
    compare_bit(match (a.to_u64(), b.to_u64()) {
        (Some(x), Some(y)) => Some(op(x, y)),
        _ => None,
    })
}

fn signed_compare<F: FnOnce(i64, i64) -> bool>(a: &LogicVec, b: &LogicVec, op: F) -> LogicVec {
    if a.width() > 64 {
        return LogicVec::all_x(1);
    }
    compare_bit(match (a.to_i64(), b.to_i64()) {
        (Some(x), Some(y)) => Some(op(x, y)),
        _ => None,
    })
}

fn shift_amount(b: &LogicVec) -> Option<u64> {
    b.to_u64()
}

fn shift_left(a: &LogicVec, amount: u64) -> LogicVec {
    let width = a.width();
    let mut out = LogicVec::new(width);
    for i in 0..width as u64 {
        if i >= amount {
            out.set(i as u32, a.get((i - amount) as u32));
        }
    }
    out
}

fn shift_right(a: &LogicVec, amount: u64, fill: Logic) -> LogicVec {
    let width = a.width() as u64;
    let mut out = LogicVec::new(a.width());
    for i in 0..width {
        let from = i + amount;
        let bit = if from < width { a.get(from as u32) } else { fill };
        out.set(i as u32, bit);
    }
    out
}

impl<'a> Visitor<'a> for Evaluator<'a> {
    type Output = Result<Value, EvalError>;

    fn buf(&mut self, _node: Node<'a>, a: Node<'a>) -> Self::Output {
        self.eval(a)
    }

    fn slice(&mut self, _node: Node<'a>, a: Node<'a>, offset: u32, out_width: u32) -> Self::Output {
        let a = self.sig(a)?;
        let mut out = LogicVec::new(out_width);
        for i in 0..out_width {
            out.set(i, a.get(offset + i));
        }
        Ok(Value::Signal(out))
    }

    fn zero_extend(&mut self, _node: Node<'a>, a: Node<'a>, out_width: u32) -> Self::Output {
        let a = self.sig(a)?;
        let mut out = LogicVec::new(out_width);
        for i in 0..a.width() {
            out.set(i, a.get(i));
        }
        Ok(Value::Signal(out))
    }

    fn sign_extend(&mut self, _node: Node<'a>, a: Node<'a>, out_width: u32) -> Self::Output {
        let a = self.sig(a)?;
        let sign = a.get(a.width() - 1);
        let mut out = LogicVec::new(out_width);
        for i in 0..out_width {
            out.set(i, if i < a.width() { a.get(i) } else { sign });
        }
        Ok(Value::Signal(out))
    }

    fn concat(&mut self, _node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output {
        let (a, b) = (self.sig(a)?, self.sig(b)?);
        let mut out = LogicVec::new(a.width() + b.width());
        for i in 0..a.width() {
            out.set(i, a.get(i));
        }
        for i in 0..b.width() {
            out.set(a.width() + i, b.get(i));
        }
        Ok(Value::Signal(out))
    }

    fn add(&mut self, _node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output {
        let (a, b) = (self.sig(a)?, self.sig(b)?);
        Ok(Value::Signal(ripple_add(&a, &b, Logic::Zero)))
    }

    fn sub(&mut self, _node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output {
        let (a, b) = (self.sig(a)?, self.sig(b)?);
        Ok(Value::Signal(ripple_add(&a, &!&b, Logic::One)))
    }

    fn mul(&mut self, _node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output {
        let (a, b) = (self.sig(a)?, self.sig(b)?);
        Ok(Value::Signal(arith_u64(&a, &b, |x, y| {
            Some(x.wrapping_mul(y))
        })))
    }

    fn unsigned_div(&mut self, _node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output {
        let (a, b) = (self.sig(a)?, self.sig(b)?);
        Ok(Value::Signal(arith_u64(&a, &b, |x, y| x.checked_div(y))))
    }

    fn unsigned_mod(&mut self, _node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output {
        let (a, b) = (self.sig(a)?, self.sig(b)?);
        Ok(Value::Signal(arith_u64(&a, &b, |x, y| x.checked_rem(y))))
    }

    fn bitwise_and(&mut self, _node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output {
        let (a, b) = (self.sig(a)?, self.sig(b)?);
        Ok(Value::Signal(&a & &b))
    }

    fn bitwise_or(&mut self, _node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output {
        let (a, b) = (self.sig(a)?, self.sig(b)?);
        Ok(Value::Signal(&a | &b))
    }

    fn bitwise_xor(&mut self, _node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output {
        let (a, b) = (self.sig(a)?, self.sig(b)?);
        Ok(Value::Signal(&a ^ &b))
    }

    fn bitwise_not(&mut self, _node: Node<'a>, a: Node<'a>) -> Self::Output {
        let a = self.sig(a)?;
        Ok(Value::Signal(!&a))
    }

    fn reduce_and(&mut self, _node: Node<'a>, a: Node<'a>) -> Self::Output {
        let a = self.sig(a)?;
        let bit = if (0..a.width()).any(|i| a.get(i) == Logic::Zero) {
            Logic::Zero
        } else if a.has_unknown() {
            Logic::X
        } else {
            Logic::One
        };
        let mut out = LogicVec::new(1);
        out.set(0, bit);
        Ok(Value::Signal(out))
    }

    fn reduce_or(&mut self, _node: Node<'a>, a: Node<'a>) -> Self::Output {
        let a = self.sig(a)?;
        let bit = if (0..a.width()).any(|i| a.get(i) == Logic::One) {
            Logic::One
        } else if a.has_unknown() {
            Logic::X
        } else {
            Logic::Zero
        };
        let mut out = LogicVec::new(1);
        out.set(0, bit);
        Ok(Value::Signal(out))
    }

    fn reduce_xor(&mut self, _node: Node<'a>, a: Node<'a>) -> Self::Output {
        let a = self.sig(a)?;
        let bit = if a.has_unknown() {
            Logic::X
        } else {
            Logic::from((0..a.width()).filter(|&i| a.get(i) == Logic::One).count() % 2 == 1)
        };
        let mut out = LogicVec::new(1);
        out.set(0, bit);
        Ok(Value::Signal(out))
    }

    fn unary_minus(&mut self, _node: Node<'a>, a: Node<'a>) -> Self::Output {
        let a = self.sig(a)?;
        let zero = LogicVec::new(a.width());
        Ok(Value::Signal(ripple_add(&zero, &!&a, Logic::One)))
    }

    fn equal(&mut self, _node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output {
        let (a, b) = (self.sig(a)?, self.sig(b)?);
        let result = if a.has_unknown() || b.has_unknown() {
            None
        } else {
            Some((0..a.width()).all(|i| a.get(i) == b.get(i)))
        };
        Ok(Value::Signal(compare_bit(result)))
    }

    fn not_equal(&mut self, _node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output {
        let (a, b) = (self.sig(a)?, self.sig(b)?);
        let result = if a.has_unknown() || b.has_unknown() {
            None
        } else {
            Some((0..a.width()).any(|i| a.get(i) != b.get(i)))
        };
        Ok(Value::Signal(compare_bit(result)))
    }

    fn signed_greater_than(&mut self, _node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output {
        let (a, b) = (self.sig(a)?, self.sig(b)?);
        Ok(Value::Signal(signed_compare(&a, &b, |x, y| x > y)))
    }

    fn signed_greater_equal(&mut self, _node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output {
        let (a, b) = (self.sig(a)?, self.sig(b)?);
        Ok(Value::Signal(signed_compare(&a, &b, |x, y| x >= y)))
    }

    fn unsigned_greater_than(&mut self, _node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output {
        let (a, b) = (self.sig(a)?, self.sig(b)?);
        Ok(Value::Signal(unsigned_compare(&a, &b, |x, y| x > y)))
    }

    fn unsigned_greater_equal(
        &mut self,
        _node: Node<'a>,
        a: Node<'a>,
        b: Node<'a>,
    ) -> Self::Output {
        let (a, b) = (self.sig(a)?, self.sig(b)?);
        Ok(Value::Signal(unsigned_compare(&a, &b, |x, y| x >= y)))
    }

    fn logical_shift_left(&mut self, _node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output {
        let (a, b) = (self.sig(a)?, self.sig(b)?);
        Ok(Value::Signal(match shift_amount(&b) {
            Some(amount) => shift_left(&a, amount),
            None => LogicVec::all_x(a.width()),
        }))
    }

    fn logical_shift_right(&mut self, _node: Node<'a>, a: Node<'a>, b: Node<'a>) -> Self::Output {
        let (a, b) = (self.sig(a)?, self.sig(b)?);
        Ok(Value::Signal(match shift_amount(&b) {
            Some(amount) => shift_right(&a, amount, Logic::Zero),
            None => LogicVec::all_x(a.width()),
        }))
    }

    fn arithmetic_shift_right(
        &mut self,
        _node: Node<'a>,
        a: Node<'a>,
        b: Node<'a>,
    ) -> Self::Output {
        let (a, b) = (self.sig(a)?, self.sig(b)?);
        let sign = a.get(a.width() - 1);
        Ok(Value::Signal(match shift_amount(&b) {
            Some(amount) => shift_right(&a, amount, sign),
            None => LogicVec::all_x(a.width()),
        }))
    }

    fn mux(&mut self, _node: Node<'a>, a: Node<'a>, b: Node<'a>, s: Node<'a>) -> Self::Output {
        let s = self.sig(s)?;
        match s.get(0) {
            Logic::Zero => self.eval(a),
            Logic::One => self.eval(b),
            Logic::X | Logic::Z => {
                // Unknown select: bits where both branches agree survive.
                let (a, b) = (self.sig(a)?, self.sig(b)?);
                let mut out = LogicVec::new(a.width());
                for i in 0..a.width() {
                    let bit = if a.get(i) == b.get(i) && !a.get(i).is_unknown() {
                        a.get(i)
                    } else {
                        Logic::X
                    };
                    out.set(i, bit);
                }
                Ok(Value::Signal(out))
            }
        }
    }

    fn constant(&mut self, _node: Node<'a>, value: &'a LogicVec) -> Self::Output {
        Ok(Value::Signal(value.clone()))
    }

    fn input(&mut self, _node: Node<'a>, name: Ident) -> Self::Output {
        self.inputs
            .get(&name)
            .cloned()
            .ok_or_else(|| EvalError::MissingInput(self.interner.display(name).to_string()))
    }

    fn state(&mut self, _node: Node<'a>, name: Ident) -> Self::Output {
        self.state
            .get(&name)
            .cloned()
            .ok_or_else(|| EvalError::MissingState(self.interner.display(name).to_string()))
    }

    fn memory_read(&mut self, _node: Node<'a>, mem: Node<'a>, addr: Node<'a>) -> Self::Output {
        let mem = self.mem(mem)?;
        let addr = self.sig(addr)?;
        Ok(Value::Signal(mem.read(&addr)))
    }

    fn memory_write(
        &mut self,
        _node: Node<'a>,
        mem: Node<'a>,
        addr: Node<'a>,
        data: Node<'a>,
    ) -> Self::Output {
        let mut mem = self.mem(mem)?;
        let addr = self.sig(addr)?;
        let data = self.sig(data)?;
        mem.write(&addr, data);
        Ok(Value::Memory(mem))
    }

    fn undriven(&mut self, _node: Node<'a>, width: u32) -> Self::Output {
        Ok(Value::Signal(LogicVec::all_x(width)))
    }
}
