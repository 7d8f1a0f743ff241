//! Máquina 1# de referencia para las pruebas.

#![allow(dead_code)]

use std::collections::HashMap;

use onehash::ir::{Op, Program, Reg, HASH, ONE};

/// Límite de pasos, para que un programa defectuoso no cuelgue las pruebas.
const MAX_STEPS: usize = 1_000_000;

#[derive(Debug, PartialEq, Eq)]
pub enum Halt {
    /// El contador de programa quedó exactamente al final.
    Proper,

    /// Un salto llevó al contador fuera del programa.
    Improper(isize),

    StepLimit,
}

#[derive(Debug, Default)]
pub struct Machine {
    registers: HashMap<u32, String>,
    pub steps: usize,
}

impl Machine {
    pub fn new(initial: &[(u32, &str)]) -> Self {
        let registers = initial
            .iter()
            .map(|&(reg, contents)| (reg, contents.to_owned()))
            .collect();

        Machine {
            registers,
            steps: 0,
        }
    }

    pub fn get(&self, reg: u32) -> &str {
        self.registers.get(&reg).map(String::as_str).unwrap_or("")
    }

    pub fn run(&mut self, program: &Program) -> Halt {
        self.run_ops(&program.ops)
    }

    pub fn run_ops(&mut self, ops: &[Op]) -> Halt {
        let mut pc: isize = 0;

        while (0..ops.len() as isize).contains(&pc) {
            if self.steps == MAX_STEPS {
                return Halt::StepLimit;
            }

            self.steps += 1;
            pc += match ops[pc as usize] {
                Op::WriteOne(Reg(reg)) => {
                    self.registers.entry(reg).or_default().push(ONE);
                    1
                }

                Op::WriteHash(Reg(reg)) => {
                    self.registers.entry(reg).or_default().push(HASH);
                    1
                }

                Op::Forward(distance) => distance as isize,
                Op::Backward(distance) => -(distance as isize),

                Op::Case(Reg(reg)) => {
                    let contents = self.registers.entry(reg).or_default();
                    match contents.chars().next() {
                        None => 1,
                        Some(symbol) => {
                            contents.remove(0);
                            if symbol == ONE {
                                2
                            } else {
                                3
                            }
                        }
                    }
                }
            };
        }

        if pc == ops.len() as isize {
            Halt::Proper
        } else {
            Halt::Improper(pc)
        }
    }
}

/// Lee texto 1#, ignorando líneas de comentario.
pub fn parse(text: &str) -> Vec<Op> {
    let code: String = text
        .lines()
        .filter(|line| !line.starts_with(';'))
        .collect();

    let mut ops = Vec::new();
    let mut chars = code.chars().peekable();

    while chars.peek().is_some() {
        let mut ones = 0;
        while chars.next_if_eq(&ONE).is_some() {
            ones += 1;
        }

        let mut hashes = 0;
        while chars.next_if_eq(&HASH).is_some() {
            hashes += 1;
        }

        ops.push(match hashes {
            1 => Op::WriteOne(Reg(ones)),
            2 => Op::WriteHash(Reg(ones)),
            3 => Op::Forward(ones),
            4 => Op::Backward(ones),
            5 => Op::Case(Reg(ones)),
            _ => panic!("bad instruction word in {:?}", code),
        });
    }

    ops
}
