//! Static function-name dictionaries and equivalence classes
//!
//! Excel localizes function names: a French workbook writes `SOMME.SI` where
//! an English one writes `SUMIF`. Grading must not care which locale the
//! learner's copy of Excel runs in, so every lookup here is bidirectional.
//!
//! The tables are process-wide immutable constants; nothing mutates them at
//! runtime.

use ahash::AHashMap;
use once_cell::sync::Lazy;

/// The two supported formula languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lang {
    /// French localized names (`SOMME`, `NB.SI`, `VRAI`)
    Fr,
    /// English canonical names (`SUM`, `COUNTIF`, `TRUE`)
    En,
}

/// (French, English) function-name pairs
///
/// Pairs whose names are identical in both languages (ABS, MAX, INDEX, ...)
/// are omitted; translation falls through to the identity for those.
pub const FUNCTION_PAIRS: &[(&str, &str)] = &[
    // Conditional aggregation
    ("SOMME.SI.ENS", "SUMIFS"),
    ("SOMME.SI", "SUMIF"),
    ("SOMME", "SUM"),
    ("SOMMEPROD", "SUMPRODUCT"),
    ("MOYENNE.SI.ENS", "AVERAGEIFS"),
    ("MOYENNE.SI", "AVERAGEIF"),
    ("MOYENNE", "AVERAGE"),
    ("NB.SI.ENS", "COUNTIFS"),
    ("NB.SI", "COUNTIF"),
    ("NB.VIDE", "COUNTBLANK"),
    ("NBVAL", "COUNTA"),
    ("NB", "COUNT"),
    // Logic
    ("SI.CONDITIONS", "IFS"),
    ("SI.NON.DISP", "IFNA"),
    ("SIERREUR", "IFERROR"),
    ("SI", "IF"),
    ("ET", "AND"),
    ("OU", "OR"),
    ("NON", "NOT"),
    ("OUX", "XOR"),
    // Lookup
    ("RECHERCHEV", "VLOOKUP"),
    ("RECHERCHEH", "HLOOKUP"),
    ("RECHERCHEX", "XLOOKUP"),
    ("RECHERCHE", "LOOKUP"),
    ("EQUIVX", "XMATCH"),
    ("EQUIV", "MATCH"),
    ("DECALER", "OFFSET"),
    ("COLONNES", "COLUMNS"),
    ("COLONNE", "COLUMN"),
    ("LIGNES", "ROWS"),
    ("LIGNE", "ROW"),
    // Text
    ("CONCATENER", "CONCATENATE"),
    ("JOINDRE.TEXTE", "TEXTJOIN"),
    ("GAUCHE", "LEFT"),
    ("DROITE", "RIGHT"),
    ("STXT", "MID"),
    ("NBCAR", "LEN"),
    ("MAJUSCULE", "UPPER"),
    ("MINUSCULE", "LOWER"),
    ("NOMPROPRE", "PROPER"),
    ("SUPPRESPACE", "TRIM"),
    ("SUBSTITUE", "SUBSTITUTE"),
    ("REMPLACER", "REPLACE"),
    ("CHERCHE", "SEARCH"),
    ("TROUVE", "FIND"),
    ("TEXTE", "TEXT"),
    ("CNUM", "VALUE"),
    // Math and rounding
    ("ARRONDI.AU.MULTIPLE", "MROUND"),
    ("ARRONDI.SUP", "ROUNDUP"),
    ("ARRONDI.INF", "ROUNDDOWN"),
    ("ARRONDI", "ROUND"),
    ("TRONQUE", "TRUNC"),
    ("ENT", "INT"),
    ("RACINE", "SQRT"),
    ("PUISSANCE", "POWER"),
    ("ALEA.ENTRE.BORNES", "RANDBETWEEN"),
    ("ALEA", "RAND"),
    // Statistics
    ("MEDIANE", "MEDIAN"),
    ("ECARTYPE", "STDEV"),
    ("GRANDE.VALEUR", "LARGE"),
    ("PETITE.VALEUR", "SMALL"),
    ("RANG", "RANK"),
    ("FREQUENCE", "FREQUENCY"),
    // Dates
    ("AUJOURDHUI", "TODAY"),
    ("MAINTENANT", "NOW"),
    ("ANNEE", "YEAR"),
    ("MOIS", "MONTH"),
    ("JOUR", "DAY"),
    ("HEURE", "HOUR"),
    ("SECONDE", "SECOND"),
    ("JOURSEM", "WEEKDAY"),
    ("NO.SEMAINE", "WEEKNUM"),
    ("FIN.MOIS", "EOMONTH"),
    ("JOURS", "DAYS"),
    // Info
    ("ESTVIDE", "ISBLANK"),
    ("ESTNUM", "ISNUMBER"),
    ("ESTTEXTE", "ISTEXT"),
    ("ESTERREUR", "ISERROR"),
    ("ESTNA", "ISNA"),
    // Database
    ("BDSOMME", "DSUM"),
    ("BDMOYENNE", "DAVERAGE"),
    ("BDNB", "DCOUNT"),
    // Dynamic arrays
    ("TRIER", "SORT"),
    ("FILTRE", "FILTER"),
];

/// (French, English) logical-literal pairs
pub const BOOLEAN_PAIRS: &[(&str, &str)] = &[("VRAI", "TRUE"), ("FAUX", "FALSE")];

/// Function families considered interchangeable for grading purposes
///
/// Distinct from translation: a learner who solves a lookup exercise with
/// `INDEX`+`EQUIV` instead of `RECHERCHEV` used an equivalent technique, not
/// a translated name.
pub const EQUIVALENCE_CLASSES: &[&[&str]] = &[
    &["SUMIF", "SOMME.SI", "SUMIFS", "SOMME.SI.ENS", "SUMPRODUCT", "SOMMEPROD"],
    &["COUNTIF", "NB.SI", "COUNTIFS", "NB.SI.ENS"],
    &["AVERAGEIF", "MOYENNE.SI", "AVERAGEIFS", "MOYENNE.SI.ENS"],
    &[
        "VLOOKUP",
        "RECHERCHEV",
        "XLOOKUP",
        "RECHERCHEX",
        "INDEX",
        "MATCH",
        "EQUIV",
    ],
    &["IF", "SI", "IFS", "SI.CONDITIONS"],
    &["CONCATENATE", "CONCATENER", "CONCAT", "TEXTJOIN", "JOINDRE.TEXTE"],
];

/// FR→EN pairs ordered longest French name first, for substitution
pub static FR_TO_EN_ORDERED: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    let mut v: Vec<_> = FUNCTION_PAIRS.to_vec();
    v.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));
    v
});

/// EN→FR pairs ordered longest English name first, for substitution
pub static EN_TO_FR_ORDERED: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    let mut v: Vec<_> = FUNCTION_PAIRS.iter().map(|&(fr, en)| (en, fr)).collect::<Vec<_>>();
    v.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));
    v
});

static FR_TO_EN_MAP: Lazy<AHashMap<&'static str, &'static str>> =
    Lazy::new(|| FUNCTION_PAIRS.iter().copied().collect());

static EN_TO_FR_MAP: Lazy<AHashMap<&'static str, &'static str>> =
    Lazy::new(|| FUNCTION_PAIRS.iter().map(|&(fr, en)| (en, fr)).collect());

static CLASS_INDEX: Lazy<AHashMap<&'static str, usize>> = Lazy::new(|| {
    let mut map = AHashMap::new();
    for (i, class) in EQUIVALENCE_CLASSES.iter().enumerate() {
        for name in class.iter() {
            map.insert(*name, i);
        }
    }
    map
});

/// Translate a function name into `target`, or return it unchanged when it is
/// already in the target language or identical in both
pub fn translate(name: &str, target: Lang) -> String {
    let upper = name.trim().to_ascii_uppercase();
    let translated = match target {
        Lang::En => FR_TO_EN_MAP.get(upper.as_str()),
        Lang::Fr => EN_TO_FR_MAP.get(upper.as_str()),
    };
    translated.map(|s| s.to_string()).unwrap_or(upper)
}

/// The other-language variant of a function name, if one exists
pub fn other_language_variant(name: &str) -> Option<&'static str> {
    let upper = name.trim().to_ascii_uppercase();
    FR_TO_EN_MAP
        .get(upper.as_str())
        .or_else(|| EN_TO_FR_MAP.get(upper.as_str()))
        .copied()
}

/// Whether two function names belong to the same equivalence class
pub fn same_equivalence_class(a: &str, b: &str) -> bool {
    let a = a.trim().to_ascii_uppercase();
    let b = b.trim().to_ascii_uppercase();
    match (CLASS_INDEX.get(a.as_str()), CLASS_INDEX.get(b.as_str())) {
        (Some(ia), Some(ib)) => ia == ib,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_translate_both_directions() {
        assert_eq!(translate("SOMME.SI", Lang::En), "SUMIF");
        assert_eq!(translate("SUMIF", Lang::Fr), "SOMME.SI");
        assert_eq!(translate("somme", Lang::En), "SUM");
        // Identical in both languages
        assert_eq!(translate("INDEX", Lang::Fr), "INDEX");
        assert_eq!(translate("MAX", Lang::En), "MAX");
    }

    #[test]
    fn test_ordered_tables_longest_first() {
        let fr: Vec<_> = FR_TO_EN_ORDERED.iter().map(|p| p.0).collect();
        let nb_si_ens = fr.iter().position(|&n| n == "NB.SI.ENS").unwrap();
        let nb_si = fr.iter().position(|&n| n == "NB.SI").unwrap();
        let nb = fr.iter().position(|&n| n == "NB").unwrap();
        assert!(nb_si_ens < nb_si && nb_si < nb);

        let en: Vec<_> = EN_TO_FR_ORDERED.iter().map(|p| p.0).collect();
        let countifs = en.iter().position(|&n| n == "COUNTIFS").unwrap();
        let count = en.iter().position(|&n| n == "COUNT").unwrap();
        assert!(countifs < count);
    }

    #[test]
    fn test_equivalence_classes() {
        assert!(same_equivalence_class("SUMIF", "SOMME.SI.ENS"));
        assert!(same_equivalence_class("RECHERCHEV", "INDEX"));
        assert!(same_equivalence_class("vlookup", "equiv"));
        assert!(!same_equivalence_class("SUMIF", "VLOOKUP"));
        assert!(!same_equivalence_class("SUMIF", "NOT_A_FUNCTION"));
    }
}
