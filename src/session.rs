use crate::{
    engine::Engine,
    handler::Handler,
    log::{error_unrecognized, replacement_failure, Error},
    region::Region,
    scan::{Scanner, Token},
};

use tracing::{debug, trace};

/// State shared by every pass of one top level expansion.
///
/// Recursive passes borrow the same `Session`, so they see the same strictness
/// and private handlers. Each pass carries its own depth.
pub struct Session<'call, C: ?Sized> {
    /// Handlers registered on the [`Engine`], searched first.
    handlers: &'call [Box<dyn Handler<C>>],
    /// Handlers given to this expansion only, searched after `handlers`.
    private: &'call [&'call dyn Handler<C>],
    /// Context passed to every handler.
    context: &'call C,
    /// When true, unrecognized macros and handler failures abort the expansion.
    strict: bool,
    /// Depth at which handler output is no longer expanded.
    max_depth: usize,
}

impl<'call, C: ?Sized> Session<'call, C> {
    /// Create a new [`Session`].
    pub fn new(
        engine: &'call Engine<C>,
        context: &'call C,
        strict: bool,
        private: &'call [&'call dyn Handler<C>],
    ) -> Self {
        Self {
            handlers: engine.handlers(),
            private,
            context,
            strict,
            max_depth: engine.max_depth(),
        }
    }

    /// Expand the given source text at the given depth.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the source contains a malformed macro, or, in strict
    /// mode, a macro that cannot be evaluated.
    pub fn expand(&self, source: &str, depth: usize) -> Result<String, Error> {
        Scanner::new(self, source, depth).scan()
    }

    /// Return the first [`Handler`] accepting the given name.
    ///
    /// Engine handlers are searched in registration order, followed by private
    /// handlers in the order they were given.
    fn find(&self, name: &str) -> Option<&'call dyn Handler<C>> {
        for handler in self.handlers {
            if handler.accepts_name(name) {
                return Some(handler.as_ref());
            }
        }

        self.private
            .iter()
            .copied()
            .find(|handler| handler.accepts_name(name))
    }

    /// Evaluate a complete [`Token`] read from `source` at `region`, and append the
    /// result to `output`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if a transform cannot be applied, if nested output is
    /// malformed, if the handler reports a syntax error, or, in strict mode, if the
    /// macro cannot be evaluated.
    pub fn dispatch(
        &self,
        token: Token,
        source: &str,
        region: Region,
        depth: usize,
        output: &mut String,
    ) -> Result<(), Error> {
        let Token {
            name,
            arguments,
            mut transforms,
        } = token;

        let Some(handler) = self.find(&name) else {
            if self.strict {
                return Err(error_unrecognized(&name, source).with_pointer(source, region));
            }
            debug!(name = %name, depth, "no handler accepts macro, copying it unchanged");
            output.push_str(region.literal(source));

            return Ok(());
        };

        let single = arguments.to_single();
        let mut replacement = match handler.evaluate(self.context, &name, &single, &arguments) {
            Ok(replacement) => replacement,
            Err(error) if self.strict || !error.kind().is_recoverable() => {
                if error.has_visual() {
                    return Err(error);
                }
                return Err(error.with_pointer(source, region));
            }
            Err(error) => {
                debug!(name = %name, depth, reason = error.reason(), "handler failed");
                output.push_str(&replacement_failure(&name, &error));

                return Ok(());
            }
        };

        if handler.has_nested_content() {
            if depth < self.max_depth {
                trace!(name = %name, depth, "expanding nested content");
                replacement = self.expand(&replacement, depth + 1)?;
            } else {
                debug!(name = %name, depth, "depth limit reached, nested content left as is");
            }
        }

        while let Some(transform) = transforms.pop() {
            replacement = transform
                .apply(replacement)
                .map_err(|e| e.with_pointer(source, region))?;
        }

        output.push_str(&replacement);
        Ok(())
    }
}
