//! Construcción de flujos de instrucciones.
//!
//! Un [`Builder`] es el único dueño del flujo de instrucciones de una
//! sesión de generación, junto con el contador de etiquetas y el conjunto
//! de registros temporales en uso. Todo lo demás (en particular los
//! combinadores de [`flow`](crate::flow)) opera a través de [`Sink`].

use std::collections::{BTreeSet, HashSet};

use tracing::trace;

use crate::{
    error::{check_reg, BuildError},
    ir::{Instruction, Label, Reg},
};

/// Primer registro temporal si no se configura otro.
pub const DEFAULT_TEMP_BASE: u32 = 1000;

/// Destino de instrucciones.
///
/// Estas son las primitivas sobre las que se construye cualquier
/// estructura de control.
pub trait Sink {
    /// Agrega una instrucción al final del flujo.
    fn emit(&mut self, instruction: Instruction);

    /// Reserva un nombre de etiqueta nuevo sin fijar su posición.
    fn fresh_label(&mut self, hint: &str) -> Label;

    /// Fija la posición de una etiqueta en el punto actual del flujo.
    fn bind(&mut self, label: &Label) -> Result<(), BuildError>;

    /// Reserva un registro temporal que ningún otro temporal vivo ocupa.
    fn alloc_temp(&mut self) -> Reg;

    /// Libera un registro obtenido de [`Sink::alloc_temp()`].
    fn free_temp(&mut self, reg: Reg);

    /// Valida un registro antes de usarlo en una instrucción.
    fn check(&self, reg: Reg) -> Result<Reg, BuildError> {
        check_reg(reg)
    }

    fn jump(&mut self, label: &Label) {
        self.emit(Instruction::Jump(label.clone()));
    }

    fn write_one(&mut self, reg: Reg) -> Result<(), BuildError> {
        let reg = self.check(reg)?;
        self.emit(Instruction::WriteOne(reg));
        Ok(())
    }

    fn write_hash(&mut self, reg: Reg) -> Result<(), BuildError> {
        let reg = self.check(reg)?;
        self.emit(Instruction::WriteHash(reg));
        Ok(())
    }

    fn case(&mut self, reg: Reg) -> Result<(), BuildError> {
        let reg = self.check(reg)?;
        self.emit(Instruction::Case(reg));
        Ok(())
    }

    fn comment<S: Into<String>>(&mut self, text: S)
    where
        Self: Sized,
    {
        self.emit(Instruction::Comment(text.into()));
    }
}

/// Contexto de construcción de un programa.
#[derive(Debug)]
pub struct Builder {
    code: Vec<Instruction>,
    next_label: u32,
    bound: HashSet<Label>,
    temps: Temps,
}

impl Builder {
    pub fn new() -> Self {
        Builder::with_temps(DEFAULT_TEMP_BASE)
    }

    /// Construye con los registros temporales a partir de `base`.
    ///
    /// Desde `base` en adelante solo se aceptan registros entregados por
    /// [`Sink::alloc_temp()`] y aún no liberados.
    pub fn with_temps(base: u32) -> Self {
        Builder {
            code: Vec::new(),
            next_label: 0,
            bound: HashSet::new(),
            temps: Temps {
                base: base.max(1),
                live: BTreeSet::new(),
            },
        }
    }

    /// Flujo acumulado hasta el momento.
    pub fn code(&self) -> &[Instruction] {
        &self.code
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn nop(&mut self) {
        self.emit(Instruction::Nop);
    }

    /// Concluye la sesión y entrega el flujo construido.
    pub fn finish(self) -> Vec<Instruction> {
        debug_assert!(self.temps.live.is_empty(), "temporaries still live");
        self.code
    }
}

impl Default for Builder {
    fn default() -> Self {
        Builder::new()
    }
}

impl Sink for Builder {
    fn emit(&mut self, instruction: Instruction) {
        self.code.push(instruction);
    }

    fn fresh_label(&mut self, hint: &str) -> Label {
        let label = Label::new(format!("{}{}", hint, self.next_label));
        self.next_label += 1;

        label
    }

    fn bind(&mut self, label: &Label) -> Result<(), BuildError> {
        if !self.bound.insert(label.clone()) {
            return Err(BuildError::DuplicateLabel(label.name().to_owned()));
        }

        trace!(label = label.name(), at = self.code.len(), "bind");
        self.emit(Instruction::SetLabel(label.clone()));

        Ok(())
    }

    fn alloc_temp(&mut self) -> Reg {
        let reg = self.temps.take();
        trace!(%reg, "temporary taken");

        reg
    }

    fn free_temp(&mut self, reg: Reg) {
        trace!(%reg, "temporary released");
        self.temps.live.remove(&reg.0);
    }

    fn check(&self, reg: Reg) -> Result<Reg, BuildError> {
        let Reg(index) = check_reg(reg)?;
        if index >= self.temps.base && !self.temps.live.contains(&index) {
            return Err(BuildError::Reserved(index));
        }

        Ok(reg)
    }
}

/// Registros temporales en uso.
#[derive(Debug)]
struct Temps {
    base: u32,
    live: BTreeSet<u32>,
}

impl Temps {
    fn take(&mut self) -> Reg {
        // Siempre el menor registro libre, así la numeración es
        // determinista para un mismo orden de llamadas
        let free = (self.base..)
            .find(|reg| !self.live.contains(reg))
            .expect("temporary register exhaustion");

        self.live.insert(free);
        Reg(free)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_labels_are_unique_and_emit_nothing() {
        let mut builder = Builder::new();
        let a = builder.fresh_label("start");
        let b = builder.fresh_label("start");
        let c = builder.fresh_label("end");

        assert_eq!(a.name(), "start0");
        assert_eq!(b.name(), "start1");
        assert_eq!(c.name(), "end2");
        assert!(builder.is_empty());
    }

    #[test]
    fn counters_are_per_builder() {
        let mut first = Builder::new();
        first.fresh_label("l");
        first.fresh_label("l");

        let mut second = Builder::new();
        assert_eq!(second.fresh_label("l").name(), "l0");
    }

    #[test]
    fn duplicate_bind_is_rejected() {
        let mut builder = Builder::new();
        let label = builder.fresh_label("l");

        builder.bind(&label).unwrap();
        assert_eq!(
            builder.bind(&label),
            Err(BuildError::DuplicateLabel(String::from("l0")))
        );

        // La primera definición se conserva intacta
        assert_eq!(builder.code(), &[Instruction::SetLabel(label)]);
    }

    #[test]
    fn jumps_may_precede_their_label() {
        let mut builder = Builder::new();
        let label = builder.fresh_label("l");

        builder.jump(&label);
        builder.write_one(Reg(1)).unwrap();
        builder.bind(&label).unwrap();

        assert_eq!(
            builder.finish(),
            vec![
                Instruction::Jump(label.clone()),
                Instruction::WriteOne(Reg(1)),
                Instruction::SetLabel(label),
            ]
        );
    }

    #[test]
    fn register_zero_is_rejected() {
        let mut builder = Builder::new();

        assert_eq!(builder.write_one(Reg(0)), Err(BuildError::RegisterIndex(0)));
        assert_eq!(builder.write_hash(Reg(0)), Err(BuildError::RegisterIndex(0)));
        assert_eq!(builder.case(Reg(0)), Err(BuildError::RegisterIndex(0)));
        assert!(builder.is_empty());
    }

    #[test]
    fn temporaries_reuse_lowest_free_register() {
        let mut builder = Builder::with_temps(10);

        let a = builder.alloc_temp();
        let b = builder.alloc_temp();
        assert_eq!((a, b), (Reg(10), Reg(11)));

        builder.free_temp(a);
        assert_eq!(builder.alloc_temp(), Reg(10));
        assert_eq!(builder.alloc_temp(), Reg(12));
    }

    #[test]
    fn only_live_temporaries_pass_the_base() {
        let mut builder = Builder::with_temps(10);
        assert_eq!(builder.write_one(Reg(9)), Ok(()));
        assert_eq!(builder.write_one(Reg(10)), Err(BuildError::Reserved(10)));

        let temp = builder.alloc_temp();
        assert_eq!(builder.case(temp), Ok(()));
        assert_eq!(builder.write_hash(Reg(11)), Err(BuildError::Reserved(11)));

        builder.free_temp(temp);
        assert_eq!(builder.write_one(temp), Err(BuildError::Reserved(10)));
        assert_eq!(builder.len(), 2);
    }
}
