//! Message templates, one per (error kind, detail level)
//!
//! Attempt 1 gets the vague template, attempt 2 the precise one, attempt 3
//! and beyond the solution. Placeholders in `{braces}` are substituted from
//! the diagnosis details; a placeholder with no matching detail is left
//! untouched rather than erased, so a missing detail is visible in tests.

use ahash::AHashMap;
use once_cell::sync::Lazy;
use sheet_mentor_core::{DetailLevel, ErrorKind};

struct TemplateSet {
    kind: ErrorKind,
    vague: &'static str,
    precise: &'static str,
    solution: &'static str,
}

static TEMPLATES: &[TemplateSet] = &[
    TemplateSet {
        kind: ErrorKind::MissingFormula,
        vague: "La cellule {cell} semble vide. Avez-vous pensé à y répondre ?",
        precise: "Aucune formule n'a été trouvée dans la cellule {cell}. Une formule y est attendue.",
        solution: "Écrivez une formule dans la cellule {cell} : commencez par = puis utilisez la fonction demandée dans la consigne.",
    },
    TemplateSet {
        kind: ErrorKind::MissingEquals,
        vague: "Le contenu de {cell} n'est pas reconnu comme un calcul.",
        precise: "Votre saisie en {cell} ne commence pas par le signe =, Excel la traite donc comme du texte.",
        solution: "Ajoutez le signe = au tout début de votre saisie en {cell} : ={formula}",
    },
    TemplateSet {
        kind: ErrorKind::UnbalancedParens,
        vague: "La formule en {cell} contient une erreur de syntaxe.",
        precise: "Dans la formule en {cell}, le nombre de parenthèses ouvrantes et fermantes ne correspond pas.",
        solution: "Comptez vos parenthèses en {cell} : chaque ( doit avoir sa ). Relisez la formule de l'intérieur vers l'extérieur.",
    },
    TemplateSet {
        kind: ErrorKind::MissingFunction,
        vague: "La formule en {cell} ne suit pas l'approche attendue.",
        precise: "La fonction {function} était attendue en {cell}, mais votre formule n'utilise aucune fonction.",
        solution: "Utilisez la fonction {function} en {cell} : elle évite de saisir le calcul à la main et s'adapte si les données changent.",
    },
    TemplateSet {
        kind: ErrorKind::WrongFunction,
        vague: "La formule en {cell} n'utilise pas la bonne technique.",
        precise: "En {cell}, vous avez utilisé {used} alors que la fonction {function} était attendue.",
        solution: "Remplacez {used} par {function} en {cell} ; c'est la fonction adaptée à cette question.",
    },
    TemplateSet {
        kind: ErrorKind::FunctionTypo,
        vague: "Le nom d'une fonction en {cell} semble mal orthographié.",
        precise: "En {cell}, {typo} n'est pas une fonction reconnue. Vérifiez l'orthographe.",
        solution: "Corrigez {typo} en {suggestion} dans la cellule {cell}.",
    },
    TemplateSet {
        kind: ErrorKind::MissingCriteriaQuotes,
        vague: "Le critère de votre formule en {cell} pose problème.",
        precise: "En {cell}, un critère texte doit être placé entre guillemets pour être compris.",
        solution: "Entourez votre critère de guillemets en {cell}, par exemple \"oui\" ou \">100\".",
    },
    TemplateSet {
        kind: ErrorKind::OperatorOutsideQuotes,
        vague: "Le critère de comparaison en {cell} est mal formé.",
        precise: "En {cell}, l'opérateur de comparaison doit être à l'intérieur des guillemets du critère.",
        solution: "Écrivez l'opérateur dans les guillemets en {cell} : \">100\" et non >\"100\".",
    },
    TemplateSet {
        kind: ErrorKind::WrongColumn,
        vague: "Votre formule en {cell} ne semble pas porter sur les bonnes données.",
        precise: "La formule en {cell} ne référence aucune plage de cellules ; une plage était attendue.",
        solution: "Sélectionnez la plage de données demandée dans la consigne (par exemple A2:A10) et utilisez-la en {cell}.",
    },
    TemplateSet {
        kind: ErrorKind::CircularReference,
        vague: "La formule en {cell} ne peut pas être calculée.",
        precise: "La formule en {cell} fait référence à sa propre cellule, ce qui crée une référence circulaire.",
        solution: "Supprimez la référence à {cell} dans la formule de {cell} : une cellule ne peut pas dépendre de son propre résultat.",
    },
    TemplateSet {
        kind: ErrorKind::MissingAbsoluteReference,
        vague: "Votre formule en {cell} risque de ne pas se recopier correctement.",
        precise: "En {cell}, la référence {reference} doit être figée avec des $ pour résister à la recopie.",
        solution: "Écrivez {reference} en référence absolue dans {cell} (ajoutez $ devant la colonne et la ligne, ou appuyez sur F4).",
    },
    TemplateSet {
        kind: ErrorKind::NaError,
        vague: "Le résultat en {cell} n'est pas celui attendu.",
        precise: "La cellule {cell} affiche #N/A : la valeur cherchée n'a pas été trouvée.",
        solution: "L'erreur #N/A en {cell} vient d'une recherche qui échoue : vérifiez la valeur cherchée et la première colonne de votre plage.",
    },
    TemplateSet {
        kind: ErrorKind::RefError,
        vague: "Le résultat en {cell} n'est pas celui attendu.",
        precise: "La cellule {cell} affiche #REF! : une référence de votre formule n'existe plus.",
        solution: "Reconstruisez la formule en {cell} en re-sélectionnant les cellules : une ligne ou colonne référencée a été supprimée.",
    },
    TemplateSet {
        kind: ErrorKind::ValueError,
        vague: "Le résultat en {cell} n'est pas celui attendu.",
        precise: "La cellule {cell} affiche #VALEUR! : un des arguments n'a pas le bon type.",
        solution: "Vérifiez en {cell} que vos calculs ne portent pas sur du texte : chaque argument doit être un nombre ou une plage de nombres.",
    },
    TemplateSet {
        kind: ErrorKind::WrongValue,
        vague: "Le résultat en {cell} n'est pas celui attendu.",
        precise: "En {cell}, votre résultat est {actual} alors que {expected} était attendu.",
        solution: "Le résultat attendu en {cell} est {expected} (vous obtenez {actual}). Vérifiez la plage utilisée et les cellules incluses dans le calcul.",
    },
    TemplateSet {
        kind: ErrorKind::CloseValue,
        vague: "Le résultat en {cell} est proche, mais pas exact.",
        precise: "En {cell}, vous obtenez {actual} : c'est presque {expected}. Un détail fausse le calcul.",
        solution: "Pour passer de {actual} à {expected} en {cell}, vérifiez les bornes de votre plage : il manque probablement une cellule, ou une de trop.",
    },
    TemplateSet {
        kind: ErrorKind::Unknown,
        vague: "La réponse en {cell} n'est pas encore correcte.",
        precise: "La réponse en {cell} ne satisfait pas toutes les attentes de la consigne. Relisez-la point par point.",
        solution: "Comparez votre réponse en {cell} à la consigne : fonction demandée, plage de données et critère éventuel doivent tous correspondre.",
    },
];

static TEMPLATE_INDEX: Lazy<AHashMap<ErrorKind, &'static TemplateSet>> =
    Lazy::new(|| TEMPLATES.iter().map(|t| (t.kind, t)).collect());

/// The template text for an error kind at a detail level
pub fn template(kind: ErrorKind, level: DetailLevel) -> &'static str {
    // Every kind has a set; Unknown backstops the lookup
    let set = TEMPLATE_INDEX
        .get(&kind)
        .or_else(|| TEMPLATE_INDEX.get(&ErrorKind::Unknown))
        .expect("template table always contains Unknown");
    match level {
        DetailLevel::Vague => set.vague,
        DetailLevel::Precise => set.precise,
        DetailLevel::Solution => set.solution,
    }
}

/// Substitute `{placeholder}` occurrences from the details map
pub fn render(template: &str, details: &AHashMap<String, String>) -> String {
    let mut out = template.to_string();
    for (key, value) in details {
        out = out.replace(&format!("{{{}}}", key), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_kind_has_three_distinct_levels() {
        for set in TEMPLATES {
            assert_ne!(set.vague, set.precise, "{:?}", set.kind);
            assert_ne!(set.precise, set.solution, "{:?}", set.kind);
            assert_ne!(set.vague, set.solution, "{:?}", set.kind);
        }
    }

    #[test]
    fn test_render_substitutes_details() {
        let mut details = AHashMap::new();
        details.insert("cell".to_string(), "C2".to_string());
        details.insert("typo".to_string(), "SOME".to_string());
        details.insert("suggestion".to_string(), "SOMME".to_string());
        let text = render(template(ErrorKind::FunctionTypo, DetailLevel::Solution), &details);
        assert_eq!(text, "Corrigez SOME en SOMME dans la cellule C2.");
    }

    #[test]
    fn test_unfilled_placeholder_is_left_visible() {
        let details = AHashMap::new();
        let text = render(template(ErrorKind::WrongValue, DetailLevel::Precise), &details);
        assert!(text.contains("{actual}"));
    }
}
