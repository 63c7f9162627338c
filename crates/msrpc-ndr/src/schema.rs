//! Declarative struct and message layouts
//!
//! `ndr_struct!` covers structs whose members are self-describing: scalars,
//! pointers, strings, fixed arrays and other such structs. Structs that end
//! in an embedded conformant array, or hold a union switched by a sibling
//! field, implement the codec traits by hand.
//!
//! `ndr_message!` covers request and response parameter lists.

/// Declare a struct and derive its NDR codec from the field order.
///
/// ```
/// use msrpc_ndr::{ndr_struct, NdrContext, NdrReader, NdrWriter, UniquePtr, NdrWString};
///
/// ndr_struct! {
///     #[derive(Debug, Clone, PartialEq, Default)]
///     pub struct Entry {
///         pub id: u16,
///         pub name: UniquePtr<NdrWString>,
///     }
/// }
///
/// let entry = Entry { id: 1, name: UniquePtr::new(NdrWString::new("x")) };
/// let mut w = NdrWriter::new(NdrContext::new());
/// w.write_param(&entry).unwrap();
/// let mut r = NdrReader::new(NdrContext::new(), w.into_bytes());
/// assert_eq!(r.read_param::<Entry>().unwrap(), entry);
/// ```
#[macro_export]
macro_rules! ndr_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$fmeta:meta])* $fvis:vis $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $(#[$fmeta])* $fvis $field: $ty, )*
        }

        impl $crate::NdrType for $name {
            const ALIGN: usize = {
                #[allow(unused_mut)]
                let mut align = 1;
                $(
                    if <$ty as $crate::NdrType>::ALIGN > align {
                        align = <$ty as $crate::NdrType>::ALIGN;
                    }
                )*
                align
            };
        }

        impl $crate::NdrEncode for $name {
            fn ndr_encode(&self, w: &mut $crate::NdrWriter) -> $crate::Result<()> {
                w.write_align(<Self as $crate::NdrType>::ALIGN)?;
                $( $crate::NdrEncode::ndr_encode(&self.$field, w)?; )*
                Ok(())
            }

            #[allow(unused_variables)]
            fn ndr_encode_deferred(&self, w: &mut $crate::NdrWriter) -> $crate::Result<()> {
                $( $crate::NdrEncode::ndr_encode_deferred(&self.$field, w)?; )*
                Ok(())
            }
        }

        impl $crate::NdrDecode for $name {
            fn ndr_decode(r: &mut $crate::NdrReader) -> $crate::Result<Self> {
                r.read_align(<Self as $crate::NdrType>::ALIGN)?;
                Ok(Self {
                    $( $field: <$ty as $crate::NdrDecode>::ndr_decode(r)?, )*
                })
            }

            #[allow(unused_variables)]
            fn ndr_decode_deferred(&mut self, r: &mut $crate::NdrReader) -> $crate::Result<()> {
                $( $crate::NdrDecode::ndr_decode_deferred(&mut self.$field, r)?; )*
                Ok(())
            }
        }
    };
}

/// Declare an operation's request or response parameters.
///
/// Parameters are marshalled in declaration order, each one complete (its
/// pointer bodies included) before the next.
#[macro_export]
macro_rules! ndr_message {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$fmeta:meta])* $fvis:vis $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $(#[$fmeta])* $fvis $field: $ty, )*
        }

        impl $crate::NdrMessage for $name {
            #[allow(unused_variables)]
            fn marshal_ndr(&self, w: &mut $crate::NdrWriter) -> $crate::Result<()> {
                $( w.write_param(&self.$field)?; )*
                Ok(())
            }

            #[allow(unused_variables)]
            fn unmarshal_ndr(r: &mut $crate::NdrReader) -> $crate::Result<Self> {
                Ok(Self {
                    $( $field: r.read_param::<$ty>()?, )*
                })
            }
        }
    };
}
