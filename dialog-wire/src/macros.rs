//! Declarative builders for schema types.
//!
//! Every bare type in the schema is a plain struct whose encoding is the
//! concatenation of its fields, and every closed value enum is an `i32` on
//! the wire. These macros derive the codec impls from the declaration.

/// Declare a bare wire struct with a constructor ID.
macro_rules! wire_struct {
    (
        $(#[$meta:meta])*
        pub struct $name:ident = $id:literal {
            $( $(#[$fmeta:meta])* pub $field:ident : $ty:ty, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name {
            $( $(#[$fmeta])* pub $field: $ty, )*
        }

        impl $crate::Identifiable for $name {
            const CONSTRUCTOR_ID: u32 = $id;
        }

        impl $crate::Serializable for $name {
            #[allow(unused_variables)]
            fn serialize(&self, buf: &mut impl Extend<u8>) {
                $( $crate::Serializable::serialize(&self.$field, buf); )*
            }
        }

        impl $crate::Deserializable for $name {
            #[allow(unused_variables)]
            fn deserialize(
                buf: $crate::deserialize::Buffer,
            ) -> $crate::deserialize::Result<Self> {
                Ok(Self {
                    $( $field: <$ty as $crate::Deserializable>::deserialize(buf)?, )*
                })
            }
        }
    };
}

/// Declare a closed value enum encoded as an `i32`.
///
/// Decoding a value outside the declared set fails with
/// [`crate::deserialize::Error::UnknownEnumValue`].
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )*
        }

        impl $name {
            /// The numeric wire value.
            pub fn value(self) -> i32 {
                match self {
                    $( Self::$variant => $value, )*
                }
            }

            /// Map a numeric wire value back to a variant.
            pub fn from_value(value: i32) -> Option<Self> {
                match value {
                    $( $value => Some(Self::$variant), )*
                    _ => None,
                }
            }
        }

        impl $crate::Serializable for $name {
            fn serialize(&self, buf: &mut impl Extend<u8>) {
                $crate::Serializable::serialize(&self.value(), buf);
            }
        }

        impl $crate::Deserializable for $name {
            fn deserialize(
                buf: $crate::deserialize::Buffer,
            ) -> $crate::deserialize::Result<Self> {
                let value = <i32 as $crate::Deserializable>::deserialize(buf)?;
                Self::from_value(value).ok_or($crate::deserialize::Error::UnknownEnumValue {
                    ty: stringify!($name),
                    value,
                })
            }
        }
    };
}
