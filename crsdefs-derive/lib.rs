use lazy_static::lazy_static;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use std::collections::HashMap;
use syn::{
    parse2, Attribute, DeriveInput, Field, GenericArgument, Ident, Lit, LitInt, LitStr, Meta,
    MetaNameValue, Type, TypePath,
};

lazy_static! {
    static ref COLUMN_TYPES: HashMap<&'static str, ColumnKind> = {
        let mut m = HashMap::new();
        m.insert("String", ColumnKind::Text);
        m.insert("f64", ColumnKind::Real);
        m.insert("f32", ColumnKind::Real);
        m.insert("i64", ColumnKind::Integer);
        m.insert("i32", ColumnKind::Integer);
        m.insert("bool", ColumnKind::Integer);
        m
    };
}

/// A macro for deriving an implementation of RegistryRow for a struct
///
/// The table_name attribute names the registry table (or view) the struct is read from,
/// and is required.
///
/// Each field maps to the column of the same name, unless a column attribute gives another
/// name, which is needed for columns such as `type` that are Rust keywords.
///
/// Text fields are selected through `CAST(column AS TEXT)`. The PROJ database declares its
/// code columns as `INTEGER_OR_TEXT`, so SQLite stores numeric codes with integer affinity
/// and a plain read into a String would fail.
/// # Usage
/// ```ignore
/// # use crsdefs_derive::RegistryRow;
///
/// #[derive(RegistryRow)]
/// #[table_name = "extent"]
/// struct Extent {
///     auth_name: String,
///     code: String,
///     name: String,
///     #[column = "west_lon"]
///     west: Option<f64>,
/// }
/// ```
#[proc_macro_derive(RegistryRow, attributes(table_name, column))]
pub fn derive_registry_row(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let inner_input = proc_macro2::TokenStream::from(input);
    proc_macro::TokenStream::from(derive_registry_row_inner(inner_input))
}

fn derive_registry_row_inner(input: proc_macro2::TokenStream) -> proc_macro2::TokenStream {
    let ast = parse2::<DeriveInput>(input).unwrap();

    let tbl_name = get_str_attr(&ast.attrs, "table_name")
        .expect("RegistryRow derive requires a #[table_name = \"...\"] attribute");

    let name = &ast.ident;

    let fields = match &ast.data {
        syn::Data::Struct(data) => match &data.fields {
            syn::Fields::Named(fields) => fields.named.iter(),
            _ => panic!("RegistryRow derive expected named fields"),
        },
        _ => panic!("RegistryRow derive expected a struct"),
    }
    .collect();

    impl_row(name, &fields, tbl_name)
}

fn get_str_attr(attrs: &[Attribute], name: &str) -> Option<String> {
    attrs
        .iter()
        .filter_map(|attr| attr.parse_meta().ok())
        .filter(|m| match m.path().get_ident() {
            Some(i) => i == name,
            None => false,
        })
        .filter_map(|m| match m {
            Meta::NameValue(MetaNameValue {
                lit: Lit::Str(ls), ..
            }) => Some(ls.value()),
            _ => panic!("#[{}] expects a string value", name),
        })
        .last()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Text,
    Real,
    Integer,
}

#[derive(Debug)]
struct ColumnInfo {
    field: Ident,
    column: String,
    kind: ColumnKind,
}

// peel an Option off if there is one, returning the inner type name
fn get_path_type_name(p: &TypePath) -> String {
    assert!(!p.path.segments.is_empty());
    let final_segment = p.path.segments.last().unwrap();
    if final_segment.ident == "Option" {
        if let syn::PathArguments::AngleBracketed(a) = &final_segment.arguments {
            assert!(a.args.len() == 1, "Only one argument allowed in an Option");
            if let GenericArgument::Type(Type::Path(inner)) = &a.args[0] {
                return get_path_type_name(inner);
            }
        }
        panic!("Unsupported use of the option type");
    }
    final_segment.ident.to_string()
}

fn column_info(f: &Field) -> ColumnInfo {
    let field = f.ident.clone().expect("Expected named field");
    let type_name = match &f.ty {
        Type::Path(tp) => get_path_type_name(tp),
        _ => panic!("Don't know how to read a registry column into {:?}", f.ty),
    };
    let kind = *COLUMN_TYPES
        .get(type_name.as_str())
        .unwrap_or_else(|| panic!("Don't know how to map {} to a registry column", type_name));
    let column = get_str_attr(&f.attrs, "column").unwrap_or_else(|| field.to_string());
    ColumnInfo {
        field,
        column,
        kind,
    }
}

fn impl_row(name: &Ident, fields: &Vec<&Field>, tbl_name: String) -> TokenStream {
    let columns: Vec<ColumnInfo> = fields.iter().map(|f| column_info(f)).collect();
    assert!(!columns.is_empty(), "RegistryRow needs at least one field");

    let select_list = columns
        .iter()
        .map(|c| match c.kind {
            ColumnKind::Text => format!("CAST({} AS TEXT)", c.column),
            ColumnKind::Real | ColumnKind::Integer => c.column.clone(),
        })
        .collect::<Vec<String>>()
        .join(", ");
    let select_sql = LitStr::new(
        &format!("SELECT {} FROM {}", select_list, tbl_name),
        Span::call_site(),
    );

    let field_names: Vec<&Ident> = columns.iter().map(|c| &c.field).collect();
    let column_nums = (0..columns.len())
        .map(|i| LitInt::new(i.to_string().as_str(), Span::call_site()))
        .collect::<Vec<LitInt>>();

    quote!(
        impl RegistryRow for #name {
            #[inline]
            fn select_sql() -> &'static str {
                #select_sql
            }

            fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
                Ok(Self {
                    #(#field_names: row.get(#column_nums)?,)*
                })
            }
        }
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use quote::quote;

    #[test]
    fn basic_test() {
        let tstream = quote!(
            #[table_name = "geodetic_crs"]
            struct GeodeticCrsRow {
                auth_name: String,
                code: String,
                #[column = "type"]
                kind: String,
                semi_major_axis: Option<f64>,
                deprecated: bool,
            }
        );
        let expanded = derive_registry_row_inner(tstream).to_string();
        assert!(expanded.contains("impl RegistryRow for GeodeticCrsRow"));
        assert!(!expanded.contains("fn table_name"));
        assert!(expanded.contains(
            "SELECT CAST(auth_name AS TEXT), CAST(code AS TEXT), CAST(type AS TEXT), semi_major_axis, deprecated FROM geodetic_crs"
        ));
    }

    #[test]
    #[should_panic(expected = "table_name")]
    fn missing_table_name() {
        let tstream = quote!(
            struct NoTable {
                code: String,
            }
        );
        derive_registry_row_inner(tstream);
    }

    #[test]
    #[should_panic(expected = "Don't know how to map")]
    fn unsupported_field_type() {
        let tstream = quote!(
            #[table_name = "extent"]
            struct BadRow {
                code: Vec<u8>,
            }
        );
        derive_registry_row_inner(tstream);
    }
}
