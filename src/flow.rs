//! Estructuras de control.
//!
//! Todo combinador de este módulo se expresa únicamente en términos de
//! las primitivas de [`Sink`], por lo cual funciona sobre cualquier
//! implementación de este y no depende de detalles internos del
//! [`Builder`](crate::builder::Builder).
//!
//! # Bloques
//! [`Flow::with_labels()`] reserva los nombres de las etiquetas de inicio
//! y fin *antes* de emitir el cuerpo, de forma que este pueda saltar a
//! cualquiera de las dos. Solo el orden reservar-luego-fijar importa.
//!
//! # Despacho
//! La instrucción `case` avanza 1, 2 o 3 posiciones, por lo cual los tres
//! saltos que le siguen inmediatamente conforman su única tabla de saltos
//! válida. [`Flow::cases()`] emite exactamente esa disposición.

use crate::{
    builder::Sink,
    error::BuildError,
    ir::{Label, Reg},
};

pub type Build = Result<(), BuildError>;

/// Etiquetas de inicio y fin de un bloque.
///
/// Dentro de un ciclo, `restart` equivale a `continue` y `exit` a `break`.
#[derive(Clone, Debug)]
pub struct Scope {
    start: Label,
    end: Label,
}

impl Scope {
    pub fn start(&self) -> &Label {
        &self.start
    }

    pub fn end(&self) -> &Label {
        &self.end
    }

    /// Salta al inicio del bloque.
    pub fn restart<S: Sink>(&self, sink: &mut S) {
        sink.jump(&self.start);
    }

    /// Salta al final del bloque.
    pub fn exit<S: Sink>(&self, sink: &mut S) {
        sink.jump(&self.end);
    }
}

/// Combinadores de flujo de control.
pub trait Flow: Sink + Sized {
    /// Bloque delimitado por dos etiquetas.
    fn with_labels<B>(&mut self, body: B) -> Build
    where
        B: FnOnce(&mut Self, &Scope) -> Build,
    {
        let scope = Scope {
            start: self.fresh_label("start"),
            end: self.fresh_label("end"),
        };

        self.bind(&scope.start)?;
        body(self, &scope)?;
        self.bind(&scope.end)
    }

    /// Despacho según el primer símbolo de `reg`.
    ///
    /// Solo se ejecuta el cuerpo correspondiente: `empty` si el registro
    /// está vacío, `one` o `hash` si inicia con `1` o `#`, en cuyo caso
    /// ese símbolo se consume.
    fn cases<E, O, H>(&mut self, reg: Reg, empty: E, one: O, hash: H) -> Build
    where
        E: FnOnce(&mut Self) -> Build,
        O: FnOnce(&mut Self) -> Build,
        H: FnOnce(&mut Self) -> Build,
    {
        let on_empty = self.fresh_label("empty");
        let on_one = self.fresh_label("one");
        let on_hash = self.fresh_label("hash");
        let post = self.fresh_label("post");

        self.case(reg)?;
        self.jump(&on_empty);
        self.jump(&on_one);
        self.jump(&on_hash);
        self.jump(&post);

        self.bind(&on_empty)?;
        empty(self)?;
        self.jump(&post);

        self.bind(&on_one)?;
        one(self)?;
        self.jump(&post);

        // El último caso cae directamente en `post`
        self.bind(&on_hash)?;
        hash(self)?;

        self.bind(&post)
    }

    /// Ciclo que consume `reg` símbolo por símbolo hasta vaciarlo.
    ///
    /// Cada cuerpo recibe el [`Scope`] del ciclo para `continue`/`break`
    /// anticipados; al terminar un cuerpo el ciclo continúa.
    fn loop_on<O, H>(&mut self, reg: Reg, one: O, hash: H) -> Build
    where
        O: FnOnce(&mut Self, &Scope) -> Build,
        H: FnOnce(&mut Self, &Scope) -> Build,
    {
        self.with_labels(|this, scope| {
            this.cases(
                reg,
                |this| {
                    scope.exit(this);
                    Ok(())
                },
                |this| {
                    one(this, scope)?;
                    scope.restart(this);
                    Ok(())
                },
                |this| {
                    hash(this, scope)?;
                    scope.restart(this);
                    Ok(())
                },
            )
        })
    }

    /// Como [`Flow::loop_on()`], para cuerpos sin salida anticipada.
    fn repeat_on<O, H>(&mut self, reg: Reg, one: O, hash: H) -> Build
    where
        O: FnOnce(&mut Self) -> Build,
        H: FnOnce(&mut Self) -> Build,
    {
        self.loop_on(reg, |this, _| one(this), |this, _| hash(this))
    }

    /// Repite `body` mientras `reg` tenga algún símbolo, descartando uno
    /// por iteración.
    fn while_nonempty<B>(&mut self, reg: Reg, body: B) -> Build
    where
        B: FnOnce(&mut Self) -> Build,
    {
        self.with_labels(|this, scope| {
            this.cases(
                reg,
                |this| {
                    scope.exit(this);
                    Ok(())
                },
                |_| Ok(()),
                |_| Ok(()),
            )?;

            body(this)?;
            scope.restart(this);

            Ok(())
        })
    }

    /// Ejecuta `body` con un registro temporal, liberado al retornar.
    ///
    /// El temporal debe estar vacío al entrar y `body` debe dejarlo vacío.
    fn with_temp<B>(&mut self, body: B) -> Build
    where
        B: FnOnce(&mut Self, Reg) -> Build,
    {
        let temp = self.alloc_temp();
        let result = body(self, temp);
        self.free_temp(temp);

        result
    }
}

impl<S: Sink> Flow for S {}
