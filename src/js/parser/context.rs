use bitflags::bitflags;

bitflags! {
    /// The set of grammatical capabilities in effect at a point in the source.
    ///
    /// A context is a plain value. Nested scopes derive a new value with [`ParseContext::enter`]
    /// and the parser restores the enclosing value when the nested scope is exited.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ParseContext: u16 {
        /// Code is strict mode code.
        const STRICT = 1 << 0;
        /// Inside a generator function, not separated from it by a non-arrow function boundary.
        const IN_GENERATOR = 1 << 1;
        /// Inside an async function, not separated from it by a non-arrow function boundary.
        const IN_ASYNC = 1 << 2;
        /// A `yield` expression may be parsed here.
        const YIELD_ALLOWED = 1 << 3;
        /// An `await` expression may be parsed here.
        const AWAIT_ALLOWED = 1 << 4;
        /// Parsing the formal parameters of a function.
        const IN_PARAMETERS = 1 << 5;
        /// The `in` operator may not appear at the top level of an expression (for loop heads).
        const DISALLOW_IN = 1 << 6;
        /// Legacy web compatibility behavior is turned off.
        const WEB_COMPAT_DISABLED = 1 << 7;
        /// Inside the body of any function, where `return` and `new.target` are allowed.
        const IN_FUNCTION = 1 << 8;
        /// Inside a loop body, where unlabeled `continue` is allowed.
        const IN_ITERATION = 1 << 9;
        /// Inside a switch statement, where unlabeled `break` is allowed.
        const IN_SWITCH = 1 << 10;
        /// Inside a class field initializer or static block.
        const IN_CLASS_FIELD = 1 << 11;
        /// Inside a method, where `super.x` is allowed.
        const IN_METHOD = 1 << 12;
        /// Inside a derived class constructor, where `super()` is allowed.
        const IN_DERIVED_CONSTRUCTOR = 1 << 13;
        /// Inside a non-arrow function or class body, where `new.target` is allowed.
        const NEW_TARGET_ALLOWED = 1 << 14;
    }
}

/// Field overrides applied by [`ParseContext::enter`]. Unset fields are inherited.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContextOverrides {
    set: ParseContext,
    clear: ParseContext,
}

impl ContextOverrides {
    pub fn new() -> ContextOverrides {
        ContextOverrides::default()
    }

    /// Override a single flag to the given value.
    pub fn with(mut self, flag: ParseContext, value: bool) -> ContextOverrides {
        if value {
            self.set.insert(flag);
            self.clear.remove(flag);
        } else {
            self.clear.insert(flag);
            self.set.remove(flag);
        }

        self
    }

    pub fn strict(self, value: bool) -> ContextOverrides {
        self.with(ParseContext::STRICT, value)
    }

    pub fn in_generator(self, value: bool) -> ContextOverrides {
        self.with(ParseContext::IN_GENERATOR, value)
    }

    pub fn in_async(self, value: bool) -> ContextOverrides {
        self.with(ParseContext::IN_ASYNC, value)
    }

    pub fn yield_allowed(self, value: bool) -> ContextOverrides {
        self.with(ParseContext::YIELD_ALLOWED, value)
    }

    pub fn await_allowed(self, value: bool) -> ContextOverrides {
        self.with(ParseContext::AWAIT_ALLOWED, value)
    }

    pub fn in_parameters(self, value: bool) -> ContextOverrides {
        self.with(ParseContext::IN_PARAMETERS, value)
    }

    pub fn disallow_in(self, value: bool) -> ContextOverrides {
        self.with(ParseContext::DISALLOW_IN, value)
    }
}

impl ParseContext {
    /// The context for the top level of a script.
    pub fn for_script(strict: bool, disable_web_compat: bool) -> ParseContext {
        let mut ctx = ParseContext::empty();
        ctx.set(ParseContext::STRICT, strict);
        ctx.set(ParseContext::WEB_COMPAT_DISABLED, disable_web_compat);
        ctx
    }

    /// Derive a new context with the given overrides, inheriting every other flag.
    pub fn enter(self, overrides: ContextOverrides) -> ParseContext {
        (self | overrides.set) - overrides.clear
    }

    /// Context for the formal parameters of a non-arrow function. Parameters are classified with
    /// the function's own generator and async status, but never allow yield or await expressions.
    pub fn for_function_params(self, is_generator: bool, is_async: bool) -> ParseContext {
        self.function_boundary()
            .enter(
                ContextOverrides::new()
                    .in_generator(is_generator)
                    .in_async(is_async)
                    .yield_allowed(false)
                    .await_allowed(false)
                    .in_parameters(true),
            )
    }

    /// Context for the body of a non-arrow function.
    pub fn for_function_body(self, is_generator: bool, is_async: bool) -> ParseContext {
        self.function_boundary()
            .enter(
                ContextOverrides::new()
                    .in_generator(is_generator)
                    .in_async(is_async)
                    .yield_allowed(is_generator)
                    .await_allowed(is_async)
                    .in_parameters(false),
            )
    }

    /// Context for the parameters and body of an arrow function. Arrows do not introduce a new
    /// generator boundary, so `yield` keeps whatever keyword status it had, but a yield
    /// expression can never appear inside an arrow.
    pub fn for_arrow(self, is_async: bool) -> ParseContext {
        let ctx = self.enter(
            ContextOverrides::new()
                .yield_allowed(false)
                .in_parameters(false)
                .disallow_in(false),
        );

        // Arrows inherit await status from the enclosing function unless they are async
        // themselves.
        let mut ctx = ctx - (ParseContext::IN_ITERATION | ParseContext::IN_SWITCH);
        if is_async {
            ctx.insert(ParseContext::IN_ASYNC | ParseContext::AWAIT_ALLOWED);
        }

        ctx | ParseContext::IN_FUNCTION
    }

    /// Context for a class static initialization block. `await` is reserved inside the block
    /// but await expressions are not allowed.
    pub fn for_static_block(self) -> ParseContext {
        let ctx = self.for_class_field() - ParseContext::IN_FUNCTION;
        ctx | ParseContext::IN_ASYNC
    }

    /// Context for a class field initializer.
    pub fn for_class_field(self) -> ParseContext {
        let ctx = self.function_boundary().enter(
            ContextOverrides::new()
                .in_generator(false)
                .in_async(false)
                .yield_allowed(false)
                .await_allowed(false)
                .in_parameters(false),
        );

        ctx | ParseContext::IN_CLASS_FIELD | ParseContext::IN_METHOD | ParseContext::STRICT
    }

    /// Flags reset on entering any non-arrow function.
    fn function_boundary(self) -> ParseContext {
        let cleared = ParseContext::DISALLOW_IN
            | ParseContext::IN_ITERATION
            | ParseContext::IN_SWITCH
            | ParseContext::IN_CLASS_FIELD
            | ParseContext::IN_METHOD
            | ParseContext::IN_DERIVED_CONSTRUCTOR;

        (self - cleared) | ParseContext::IN_FUNCTION | ParseContext::NEW_TARGET_ALLOWED
    }

    #[inline]
    pub fn is_strict(self) -> bool {
        self.contains(ParseContext::STRICT)
    }

    #[inline]
    pub fn in_generator(self) -> bool {
        self.contains(ParseContext::IN_GENERATOR)
    }

    #[inline]
    pub fn in_async(self) -> bool {
        self.contains(ParseContext::IN_ASYNC)
    }

    #[inline]
    pub fn yield_allowed(self) -> bool {
        self.contains(ParseContext::YIELD_ALLOWED)
    }

    #[inline]
    pub fn await_allowed(self) -> bool {
        self.contains(ParseContext::AWAIT_ALLOWED)
    }

    #[inline]
    pub fn in_parameters(self) -> bool {
        self.contains(ParseContext::IN_PARAMETERS)
    }

    #[inline]
    pub fn disallow_in(self) -> bool {
        self.contains(ParseContext::DISALLOW_IN)
    }

    #[inline]
    pub fn web_compat_disabled(self) -> bool {
        self.contains(ParseContext::WEB_COMPAT_DISABLED)
    }

    #[inline]
    pub fn in_function(self) -> bool {
        self.contains(ParseContext::IN_FUNCTION)
    }

    #[inline]
    pub fn new_target_allowed(self) -> bool {
        self.contains(ParseContext::NEW_TARGET_ALLOWED)
    }

    #[inline]
    pub fn in_iteration(self) -> bool {
        self.contains(ParseContext::IN_ITERATION)
    }

    #[inline]
    pub fn in_breakable(self) -> bool {
        self.intersects(ParseContext::IN_ITERATION | ParseContext::IN_SWITCH)
    }

    #[inline]
    pub fn in_class_field(self) -> bool {
        self.contains(ParseContext::IN_CLASS_FIELD)
    }

    #[inline]
    pub fn in_method(self) -> bool {
        self.contains(ParseContext::IN_METHOD)
    }

    #[inline]
    pub fn in_derived_constructor(self) -> bool {
        self.contains(ParseContext::IN_DERIVED_CONSTRUCTOR)
    }

    /// Whether legacy web compatibility behavior applies, which requires sloppy mode code.
    #[inline]
    pub fn allows_web_compat(self) -> bool {
        !self.web_compat_disabled() && !self.is_strict()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_overrides_only_named_flags() {
        let outer = ParseContext::STRICT | ParseContext::DISALLOW_IN;
        let inner = outer.enter(ContextOverrides::new().yield_allowed(true).disallow_in(false));

        assert!(inner.is_strict());
        assert!(inner.yield_allowed());
        assert!(!inner.disallow_in());

        // The original value is untouched
        assert!(outer.disallow_in());
        assert!(!outer.yield_allowed());
    }

    #[test]
    fn last_override_wins() {
        let ctx = ParseContext::empty()
            .enter(ContextOverrides::new().in_generator(true).in_generator(false));
        assert!(!ctx.in_generator());
    }

    #[test]
    fn generator_body_allows_yield() {
        let ctx = ParseContext::for_script(false, false).for_function_body(true, false);
        assert!(ctx.in_generator());
        assert!(ctx.yield_allowed());
        assert!(ctx.in_function());
    }

    #[test]
    fn generator_params_classify_yield_but_disallow_it() {
        let ctx = ParseContext::for_script(false, false).for_function_params(true, false);
        assert!(ctx.in_generator());
        assert!(ctx.in_parameters());
        assert!(!ctx.yield_allowed());
    }

    #[test]
    fn nested_plain_function_resets_generator() {
        let generator = ParseContext::for_script(false, false).for_function_body(true, false);
        let nested = generator.for_function_body(false, false);
        assert!(!nested.in_generator());
        assert!(!nested.yield_allowed());
    }

    #[test]
    fn arrow_keeps_generator_but_not_yield() {
        let generator = ParseContext::for_script(false, false).for_function_body(true, false);
        let arrow = generator.for_arrow(false);
        assert!(arrow.in_generator());
        assert!(!arrow.yield_allowed());
    }

    #[test]
    fn loop_flags_do_not_cross_functions() {
        let in_loop = ParseContext::IN_ITERATION | ParseContext::IN_SWITCH;
        assert!(!in_loop.for_function_body(false, false).in_breakable());
        assert!(!in_loop.for_arrow(false).in_breakable());
    }

    #[test]
    fn new_target_follows_non_arrow_functions() {
        let script = ParseContext::for_script(false, false);
        assert!(!script.new_target_allowed());
        assert!(!script.for_arrow(false).new_target_allowed());
        assert!(script.for_function_body(false, false).for_arrow(false).new_target_allowed());
        assert!(script.for_static_block().new_target_allowed());
    }

    #[test]
    fn web_compat_requires_sloppy_mode() {
        assert!(ParseContext::for_script(false, false).allows_web_compat());
        assert!(!ParseContext::for_script(true, false).allows_web_compat());
        assert!(!ParseContext::for_script(false, true).allows_web_compat());
    }
}
