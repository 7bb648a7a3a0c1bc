//! Helper macro for generating domain port error enums.
//!
//! Every port error carries a single human-readable `message`; adapters map
//! transport-specific failures into these categories so the domain stays
//! free of Diesel and reqwest types.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant {
                    /// Human-readable failure detail.
                    message: String,
                },
            )*
        }

        impl $name {
            ::paste::paste! {
                $(
                    /// Construct the variant from any displayable message.
                    pub fn [<$variant:snake>](message: impl ::std::fmt::Display) -> Self {
                        Self::$variant { message: message.to_string() }
                    }
                )*
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        /// Example error used to exercise the macro.
        pub enum ExamplePortError {
            /// Transport-level failure.
            Transport => "transport failed: {message}",
            /// Decoding failure.
            Decode => "decode failed: {message}",
        }
    }

    #[test]
    fn constructors_accept_any_display_value() {
        let err = ExamplePortError::transport("connection refused");
        assert_eq!(err.to_string(), "transport failed: connection refused");
    }

    #[test]
    fn variants_compare_by_message() {
        assert_eq!(
            ExamplePortError::decode("bad json"),
            ExamplePortError::Decode {
                message: "bad json".to_owned()
            }
        );
    }
}
