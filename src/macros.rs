macro_rules! enum_with_unknown {
    (
        $( #[$enum_attr:meta] )*
        pub enum $name:ident($ty:ty) {
            $(
                $( #[$variant_attr:meta] )*
                $variant:ident = $value:expr
            ),+ $(,)?
        }
    ) => {
        #[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
        $( #[$enum_attr] )*
        pub enum $name {
            $(
                $( #[$variant_attr] )*
                $variant
            ),*,
            Unknown($ty),
        }

        impl ::core::convert::From<$ty> for $name {
            fn from(value: $ty) -> Self {
                match value {
                    $( $value => $name::$variant ),*,
                    other => $name::Unknown(other),
                }
            }
        }

        impl ::core::convert::From<$name> for $ty {
            fn from(value: $name) -> Self {
                match value {
                    $( $name::$variant => $value ),*,
                    $name::Unknown(other) => other,
                }
            }
        }
    }
}

/// Expands a list of method signatures into public methods that delegate to
/// the named member, inside the surrounding `impl` block:
///
/// ```ignore
/// impl Facade {
///     forward! {
///         to member:
///         fn field(&self) -> u8;
///         fn set_field(&mut self, value: u8) -> Result<()>;
///     }
/// }
/// ```
///
/// The expansion is purely structural; any validation lives in the member's
/// own methods.
macro_rules! forward {
    (to $member:ident: $($rest:tt)*) => {
        forward!(@munch $member; $($rest)*);
    };
    (@munch $member:ident;) => {};
    (@munch $member:ident;
        $( #[$meta:meta] )*
        fn $name:ident(&self) -> $ret:ty;
        $($rest:tt)*
    ) => {
        $( #[$meta] )*
        pub fn $name(&self) -> $ret {
            self.$member.$name()
        }
        forward!(@munch $member; $($rest)*);
    };
    (@munch $member:ident;
        $( #[$meta:meta] )*
        fn $name:ident(&mut self $(, $arg:ident: $argty:ty )*) $(-> $ret:ty)?;
        $($rest:tt)*
    ) => {
        $( #[$meta] )*
        pub fn $name(&mut self $(, $arg: $argty )*) $(-> $ret)? {
            self.$member.$name($($arg),*)
        }
        forward!(@munch $member; $($rest)*);
    };
}
