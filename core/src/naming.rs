//! Name normalization rules.
//!
//! Pure functions turning raw schema identifiers into model-safe class and
//! field names. Two of them, [`singularize`] and [`enumeration_class_name`],
//! are lossy string heuristics rather than linguistic rules; their quirks are
//! pinned down by the tests at the bottom of this module.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::LIST_ELEMENT_SUFFIX;

/// Brand substring stripped from enumeration names by default.
pub const DEFAULT_BRAND_SUBSTRING: &str = "Pokemon";

/// Suffix appended to field names that collide with a reserved word.
pub const RESERVED_SUFFIX: &str = "_1";

/// Converts a snake_case schema name to CamelCase.
///
/// Underscores become word breaks; within each run of letters the first
/// letter is upper-cased and the rest lower-cased. Any character that is not
/// a cased letter (digits included) starts a new word.
///
/// # Examples
///
/// ```
/// use xsd_model_core::to_camel_case;
///
/// assert_eq!(to_camel_case("tm_set"), "TmSet");
/// assert_eq!(to_camel_case("learn_method_list"), "LearnMethodList");
/// assert_eq!(to_camel_case("HP"), "Hp");
/// assert_eq!(to_camel_case("gen3_moves"), "Gen3Moves");
/// ```
pub fn to_camel_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut previous_cased = false;

    for ch in raw.chars() {
        if ch == '_' || ch == ' ' {
            previous_cased = false;
            continue;
        }
        let cased = ch.is_lowercase() || ch.is_uppercase();
        if cased {
            if previous_cased {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
        } else {
            out.push(ch);
        }
        previous_cased = cased;
    }

    out
}

/// Strips one trailing `s` from a class name.
///
/// Used only to guess the element type listed by a `...ListElement` wrapper.
/// Any name ending in `s` loses it, plural or not (`Status` → `Statu`).
///
/// # Examples
///
/// ```
/// use xsd_model_core::singularize;
///
/// assert_eq!(singularize("Moves"), "Move");
/// assert_eq!(singularize("TmSet"), "TmSet");
/// ```
pub fn singularize(name: &str) -> &str {
    name.strip_suffix('s').unwrap_or(name)
}

/// Derives the class name of an enumeration from its raw simple-type name.
///
/// Capitalizes the first letter and removes every occurrence of `brand`,
/// wherever it appears. If removing the brand leaves the name starting with
/// underscores, they are trimmed and the first letter is capitalized again.
///
/// # Examples
///
/// ```
/// use xsd_model_core::enumeration_class_name;
///
/// assert_eq!(enumeration_class_name("pokemon_type", "Pokemon"), "Type");
/// assert_eq!(enumeration_class_name("PokemonType", "Pokemon"), "Type");
/// assert_eq!(enumeration_class_name("learn_method", "Pokemon"), "Learn_method");
/// ```
pub fn enumeration_class_name(raw: &str, brand: &str) -> String {
    let mut name = capitalize_first(raw);
    if !brand.is_empty() && name.contains(brand) {
        name = name.replace(brand, "");
        if name.starts_with('_') {
            name = capitalize_first(name.trim_start_matches('_'));
        }
    }
    name
}

/// Returns the listed element name of a `...ListElement` class, if any.
///
/// # Examples
///
/// ```
/// use xsd_model_core::list_element_base;
///
/// assert_eq!(list_element_base("TmListElement"), Some("Tm"));
/// assert_eq!(list_element_base("Tm"), None);
/// ```
pub fn list_element_base(class_name: &str) -> Option<&str> {
    class_name
        .strip_suffix(LIST_ELEMENT_SUFFIX)
        .filter(|base| !base.is_empty())
}

/// Converts a CamelCase class name to snake_case.
///
/// Used by emitters that need table-style names.
///
/// # Examples
///
/// ```
/// use xsd_model_core::to_snake_case;
///
/// assert_eq!(to_snake_case("TmSetListElement"), "tm_set_list_element");
/// assert_eq!(to_snake_case("Learn_method"), "learn_method");
/// ```
pub fn to_snake_case(class_name: &str) -> String {
    let mut out = String::with_capacity(class_name.len() + 4);
    let mut previous_lower_or_digit = false;
    for ch in class_name.chars() {
        if ch.is_uppercase() {
            if previous_lower_or_digit && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
            previous_lower_or_digit = false;
        } else {
            out.push(ch);
            previous_lower_or_digit = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }
    out
}

fn capitalize_first(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Target representation the model set is rendered into.
///
/// Each target reserves a different set of identifiers, see
/// [`ReservedWords::for_target`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Django `models.py` classes (the default).
    #[default]
    Django,
    /// SQLite tables.
    Sqlite,
}

impl Target {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Django => "django",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Identifiers that may not be used verbatim as field names.
///
/// # Examples
///
/// ```
/// use xsd_model_core::{ReservedWords, Target};
///
/// let reserved = ReservedWords::for_target(Target::Django);
/// assert_eq!(reserved.normalize_field_name("type"), "type_1");
/// assert_eq!(reserved.normalize_field_name("name"), "name");
///
/// let custom = ReservedWords::new(["class", "def"]);
/// assert_eq!(custom.normalize_field_name("class"), "class_1");
/// assert_eq!(custom.normalize_field_name("type"), "type");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedWords {
    words: BTreeSet<String>,
}

impl ReservedWords {
    /// Creates a reserved set from explicit words.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Preset for a target representation.
    ///
    /// Django reserves only `type`. SQLite additionally reserves the SQL
    /// keywords most likely to show up as schema field names.
    pub fn for_target(target: Target) -> Self {
        match target {
            Target::Django => Self::new(["type"]),
            Target::Sqlite => Self::new([
                "type",
                "order",
                "group",
                "index",
                "table",
                "references",
                "default",
                "check",
                "select",
                "where",
                "primary",
                "key",
            ]),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    /// Escapes `raw` if it is reserved by appending [`RESERVED_SUFFIX`].
    pub fn normalize_field_name(&self, raw: &str) -> String {
        if self.contains(raw) {
            format!("{raw}{RESERVED_SUFFIX}")
        } else {
            raw.to_string()
        }
    }
}

impl Default for ReservedWords {
    fn default() -> Self {
        Self::for_target(Target::default())
    }
}

/// Escapes a field name against the default (Django) reserved set.
///
/// # Examples
///
/// ```
/// use xsd_model_core::normalize_field_name;
///
/// assert_eq!(normalize_field_name("type"), "type_1");
/// assert_eq!(normalize_field_name("level"), "level");
/// ```
pub fn normalize_field_name(raw: &str) -> String {
    ReservedWords::default().normalize_field_name(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_basic() {
        assert_eq!(to_camel_case("pokemon"), "Pokemon");
        assert_eq!(to_camel_case("type_effectiveness"), "TypeEffectiveness");
        assert_eq!(to_camel_case("rom_hack"), "RomHack");
    }

    #[test]
    fn test_camel_case_lowercases_inner_capitals() {
        assert_eq!(to_camel_case("learnSet"), "Learnset");
        assert_eq!(to_camel_case("TM_set"), "TmSet");
    }

    #[test]
    fn test_camel_case_digits_start_new_word() {
        assert_eq!(to_camel_case("hp2x"), "Hp2X");
        assert_eq!(to_camel_case("gen_3"), "Gen3");
    }

    #[test]
    fn test_camel_case_degenerate_inputs() {
        assert_eq!(to_camel_case(""), "");
        assert_eq!(to_camel_case("___"), "");
        assert_eq!(to_camel_case("_a_b_"), "AB");
    }

    #[test]
    fn test_singularize_strips_any_trailing_s() {
        assert_eq!(singularize("Moves"), "Move");
        assert_eq!(singularize("Abilities"), "Abilitie");
        assert_eq!(singularize("Status"), "Statu");
        assert_eq!(singularize("Ss"), "S");
        assert_eq!(singularize("s"), "");
        assert_eq!(singularize("Nature"), "Nature");
    }

    #[test]
    fn test_singularize_is_case_sensitive() {
        assert_eq!(singularize("MOVES"), "MOVES");
    }

    #[test]
    fn test_enumeration_brand_removed_anywhere() {
        assert_eq!(enumeration_class_name("type", "Pokemon"), "Type");
        assert_eq!(enumeration_class_name("typePokemonKind", "Pokemon"), "TypeKind");
        assert_eq!(enumeration_class_name("PokemonPokemon", "Pokemon"), "");
    }

    #[test]
    fn test_enumeration_brand_is_case_sensitive_after_capitalizing() {
        // Only the first letter is capitalized, so an inner lowercase brand stays.
        assert_eq!(enumeration_class_name("type_pokemon", "Pokemon"), "Type_pokemon");
        assert_eq!(enumeration_class_name("pokemon_type", "Pokemon"), "Type");
    }

    #[test]
    fn test_enumeration_empty_brand_keeps_name() {
        assert_eq!(enumeration_class_name("pokemon_type", ""), "Pokemon_type");
    }

    #[test]
    fn test_list_element_base() {
        assert_eq!(list_element_base("MovesListElement"), Some("Moves"));
        assert_eq!(list_element_base("ListElement"), None);
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("Pokemon"), "pokemon");
        assert_eq!(to_snake_case("Gen3Moves"), "gen3_moves");
        assert_eq!(to_snake_case("Type"), "type");
    }

    #[test]
    fn test_reserved_presets() {
        let sqlite = ReservedWords::for_target(Target::Sqlite);
        assert_eq!(sqlite.normalize_field_name("order"), "order_1");
        assert_eq!(sqlite.normalize_field_name("type"), "type_1");
        let django = ReservedWords::default();
        assert_eq!(django.normalize_field_name("order"), "order");
        assert_eq!(django.words().collect::<Vec<_>>(), vec!["type"]);
    }
}
