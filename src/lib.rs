//! Generador de programas para la máquina de registros de texto 1#.
//!
//! # Construcción
//! Un programa se construye sobre un [`Builder`](builder::Builder), ya
//! sea con sus primitivas (emitir, reservar y fijar etiquetas, saltar)
//! o con las estructuras de control de [`flow`]: bloques con etiquetas,
//! despacho de tres vías sobre el primer símbolo de un registro y ciclos.
//! Las rutinas listas para usar se encuentran en [`library`]. El resultado
//! es un flujo de [`Instruction`](ir::Instruction) con etiquetas simbólicas.
//!
//! # Resolución y emisión
//! Una vez concluida la construcción, [`resolve()`] reemplaza cada etiqueta
//! por distancias relativas concretas, y [`encode`] escribe el programa
//! resultante como texto 1#. Ninguna fase regresa a una anterior.

pub mod builder;
pub mod encode;
pub mod error;
pub mod flow;
pub mod ir;
pub mod library;

mod resolve;

pub use resolve::resolve;
