//! Macros for ergonomic state machine construction.

/// Declare a state enum and implement [`State`](crate::core::State) for it.
///
/// Variants are named by their identifier unless a label is given. Variants
/// listed under `final:` report `is_final() == true`.
///
/// # Example
///
/// ```
/// use txfsm::state_enum;
/// use txfsm::core::State;
///
/// state_enum! {
///     pub enum TransferState {
///         Pending = "pending",
///         Authorized = "authorized",
///         PartiallyAuthorized = "partially_authorized",
///         Voided = "voided",
///         Captured = "captured",
///     }
///     final: [Voided, Captured]
/// }
///
/// assert_eq!(TransferState::PartiallyAuthorized.name(), "partially_authorized");
/// assert!(TransferState::Captured.is_final());
/// ```
#[macro_export]
macro_rules! state_enum {
    (@name $variant:ident $label:literal) => {
        $label
    };
    (@name $variant:ident) => {
        stringify!($variant)
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $(= $label:literal)?
            ),* $(,)?
        }

        $(final: [$($final:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => $crate::state_enum!(@name $variant $($label)?)),*
                }
            }

            fn is_final(&self) -> bool {
                match self {
                    $($(Self::$final => true,)*)?
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::core::State;

    state_enum! {
        enum Stage {
            Pending = "pending",
            Authorized = "authorized",
            Voided = "voided",
            Captured,
        }
        final: [Voided, Captured]
    }

    #[test]
    fn state_enum_macro_generates_trait() {
        assert_eq!(Stage::Pending.name(), "pending");
        assert!(!Stage::Pending.is_final());
        assert!(!Stage::Authorized.is_final());
        assert!(Stage::Voided.is_final());
    }

    #[test]
    fn unlabelled_variants_use_identifier() {
        assert_eq!(Stage::Captured.name(), "Captured");
        assert!(Stage::Captured.is_final());
    }

    #[test]
    fn state_enum_supports_visibility() {
        state_enum! {
            pub enum PublicStage {
                A,
                B,
            }
            final: [B]
        }

        let _stage = PublicStage::A;
    }

    #[test]
    fn state_enum_works_without_final() {
        state_enum! {
            enum MinimalStage {
                One,
                Two,
            }
        }

        assert!(!MinimalStage::One.is_final());
        assert!(!MinimalStage::Two.is_final());
    }

    #[test]
    fn all_final_states_compile() {
        state_enum! {
            enum Terminal {
                Done,
            }
            final: [Done]
        }

        assert!(Terminal::Done.is_final());
    }
}
