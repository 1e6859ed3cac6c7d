use crate::{
    environment::{substitute, Environment},
    handler::Handler,
    log::Error,
    session::Session,
    Store,
};

use tracing::debug;

/// Depth at which the output of nested content handlers is no longer expanded.
pub const MAX_DEPTH: usize = 10;

/// Provides storage for handlers, and expands source text with them.
///
/// `C` is the type of the context passed through to every [`Handler`]. The engine
/// never inspects it.
pub struct Engine<C: ?Sized = Store> {
    /// Handlers that this engine is aware of, in registration order.
    handlers: Vec<Box<dyn Handler<C>>>,
    /// Depth at which nested content is no longer expanded.
    max_depth: usize,
}

impl<C: ?Sized> Engine<C> {
    /// Create a new [`Engine`] with no handlers.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand every macro in the given source text.
    ///
    /// Handlers registered on the [`Engine`] are searched first, in registration
    /// order, followed by the `private` handlers in the order given. The first
    /// handler accepting a macro name evaluates the macro.
    ///
    /// When `strict` is false, a macro that no handler accepts is copied unchanged,
    /// and a handler failure is rendered in place of the macro as
    /// `[Error replacing 'NAME' - reason]`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the source contains a malformed macro. When `strict`
    /// is true, also returns an `Error` when no handler accepts a macro name, or a
    /// handler fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use dime::{handler::from_fn, Arguments, Engine, ErrorKind};
    ///
    /// let engine = Engine::new()
    ///     .with_handler(from_fn("NAME", |_: &(), _: &Arguments| Ok("taylor".to_string())));
    ///
    /// assert_eq!(engine.expand(&(), "hello, $NAME!", true, &[]).unwrap(), "hello, taylor!");
    /// assert_eq!(engine.expand(&(), "costs $69.99", true, &[]).unwrap(), "costs $69.99");
    /// assert_eq!(engine.expand(&(), "hi ${OTHER}", false, &[]).unwrap(), "hi ${OTHER}");
    ///
    /// let error = engine.expand(&(), "hi ${OTHER}", true, &[]).unwrap_err();
    /// assert_eq!(error.kind(), ErrorKind::Unresolved);
    /// ```
    pub fn expand(
        &self,
        context: &C,
        source: &str,
        strict: bool,
        private: &[&dyn Handler<C>],
    ) -> Result<String, Error> {
        Session::new(self, context, strict, private).expand(source, 0)
    }

    /// Substitute environment variables in the given source text, then expand every
    /// macro as [`expand`][`Engine::expand`] does.
    ///
    /// `$NAME` and `${NAME}` are replaced when the [`Environment`] defines `NAME`, and
    /// left alone otherwise. An escaped `$$` survives substitution, so it still
    /// prevents expansion of the macro that follows.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] under the same conditions as [`expand`][`Engine::expand`].
    ///
    /// # Examples
    ///
    /// ```
    /// use dime::{handler::from_fn, Arguments, Engine};
    /// use std::collections::HashMap;
    ///
    /// let engine = Engine::new()
    ///     .with_handler(from_fn("STATUS", |_: &(), _: &Arguments| Ok("passed".to_string())));
    /// let environment = HashMap::from([("JOB".to_string(), "nightly".to_string())]);
    ///
    /// let result = engine.expand_all(&(), "$JOB ${STATUS} $${STATUS}", true, &[], &environment);
    /// assert_eq!(result.unwrap(), "nightly passed ${STATUS}");
    /// ```
    pub fn expand_all<E>(
        &self,
        context: &C,
        source: &str,
        strict: bool,
        private: &[&dyn Handler<C>],
        environment: &E,
    ) -> Result<String, Error>
    where
        E: Environment + ?Sized,
    {
        if source.is_empty() {
            return Ok(String::new());
        }

        let substituted = substitute(&source.replace("$$", "$$$$"), environment);
        debug!(source, substituted = %substituted, "substituted environment");

        self.expand(context, &substituted, strict, private)
    }

    /// Add a [`Handler`].
    ///
    /// Handlers are searched in the order they are added, so a handler added earlier
    /// takes precedence over one added later that accepts the same name.
    pub fn add_handler<T>(&mut self, handler: T)
    where
        T: Handler<C> + 'static,
    {
        self.handlers.push(Box::new(handler));
    }

    /// Add a [`Handler`].
    ///
    /// Returns the [`Engine`], so additional methods may be chained.
    #[inline]
    pub fn with_handler<T>(mut self, handler: T) -> Self
    where
        T: Handler<C> + 'static,
    {
        self.add_handler(handler);

        self
    }

    /// Return the first registered [`Handler`] that accepts the given name.
    pub fn get_handler(&self, name: &str) -> Option<&dyn Handler<C>> {
        self.handlers
            .iter()
            .find(|handler| handler.accepts_name(name))
            .map(|handler| handler.as_ref())
    }

    /// Return the registered handlers, in registration order.
    #[inline]
    pub fn handlers(&self) -> &[Box<dyn Handler<C>>] {
        &self.handlers
    }

    /// Set the depth at which the output of nested content handlers is no longer
    /// expanded. Defaults to [`MAX_DEPTH`].
    #[inline]
    pub fn set_max_depth(&mut self, depth: usize) {
        self.max_depth = depth;
    }

    /// Set the depth at which the output of nested content handlers is no longer
    /// expanded.
    ///
    /// Returns the [`Engine`], so additional methods may be chained.
    #[inline]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.set_max_depth(depth);

        self
    }

    /// Return the depth at which nested content is no longer expanded.
    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl<C: ?Sized> Default for Engine<C> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
            max_depth: MAX_DEPTH,
        }
    }
}
