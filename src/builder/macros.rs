//! Macros for ergonomic state machine construction.

/// Generate a [`StateEnum`](crate::core::StateEnum) implementation for a simple enum.
///
/// Each member may carry a description after `=>`; without one the member
/// name is used. An optional `initial:` line marks the initial member.
///
/// Besides the trait, the macro implements `AsRef<str>`, equality with
/// [`State`](crate::core::State) and conversion into it, so members can be
/// passed anywhere a state name is accepted.
///
/// # Example
///
/// ```
/// use statewise::core::{State, StateEnum};
/// use statewise::state_enum;
///
/// state_enum! {
///     pub enum Order {
///         Placed => "Waiting for payment",
///         Paid => "Payment received",
///         Shipped,
///     }
///     initial: Placed
/// }
///
/// assert_eq!(Order::initial(), Some(Order::Placed));
/// assert_eq!(Order::Shipped.description(), "Shipped");
/// assert!(State::new("Paid") == Order::Paid);
/// ```
#[macro_export]
macro_rules! state_enum {
    (@description $variant:ident $description:literal) => {
        $description
    };
    (@description $variant:ident) => {
        stringify!($variant)
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $(=> $description:literal)?
            ),* $(,)?
        }

        $(initial: $initial:ident)?
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::StateEnum for $name {
            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            fn description(&self) -> &'static str {
                match self {
                    $(Self::$variant => $crate::state_enum!(@description $variant $($description)?)),*
                }
            }

            fn variants() -> &'static [Self] {
                &[$(Self::$variant),*]
            }

            $(
                fn initial() -> Option<Self> {
                    Some(Self::$initial)
                }
            )?
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                $crate::core::StateEnum::name(self)
            }
        }

        impl PartialEq<$name> for $crate::core::State {
            fn eq(&self, other: &$name) -> bool {
                self.name() == $crate::core::StateEnum::name(other)
            }
        }

        impl From<$name> for $crate::core::State {
            fn from(member: $name) -> Self {
                $crate::core::State::from_member(member)
            }
        }
    };
}
