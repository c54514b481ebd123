#![forbid(unsafe_code)]

//! Tree navigation helpers shared by node-match and aggregate checks
//!
//! All position helpers convert tree-sitter's 0-based rows and columns to
//! the 1-based numbering violations use.

use tree_sitter::Node;

/// 1-based line of a node's start
pub fn start_line(node: Node) -> u32 {
    node.start_position().row as u32 + 1
}

/// 1-based column of a node's start
pub fn start_column(node: Node) -> u32 {
    node.start_position().column as u32 + 1
}

/// Source text covered by a node
///
/// Empty when the node's byte range does not fall on character boundaries,
/// which does not happen for trees parsed from valid UTF-8.
pub fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    source
        .get(node.start_byte()..node.end_byte())
        .unwrap_or("")
}

/// First `identifier` in the subtree, depth-first
pub fn find_identifier<'a>(node: Node, source: &'a str) -> Option<&'a str> {
    if node.kind() == "identifier" {
        return Some(node_text(node, source));
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(name) = find_identifier(child, source) {
            return Some(name);
        }
    }
    None
}

/// First direct child of the given kind
pub fn direct_child<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|c| c.kind() == kind)
}

/// Collects all descendants of the given kind, depth-first
pub fn collect_kind<'t>(node: Node<'t>, kind: &str, out: &mut Vec<Node<'t>>) {
    if node.kind() == kind {
        out.push(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_kind(child, kind, out);
    }
}

/// Innermost `function_declarator` under a declarator subtree
///
/// For function-pointer return types like `int (*f(void))(int)` the
/// declarators nest; the innermost one carries the actual function name
/// and parameter list. Wrapping pointer, array, and parenthesized
/// declarators are looked through.
pub fn innermost_function_declarator(node: Node) -> Option<Node> {
    match node.kind() {
        "function_declarator" => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if let Some(inner) = innermost_function_declarator(child) {
                    return Some(inner);
                }
            }
            Some(node)
        }
        "pointer_declarator" | "array_declarator" | "parenthesized_declarator" => {
            let mut cursor = node.walk();
            node.children(&mut cursor)
                .find_map(innermost_function_declarator)
        }
        _ => None,
    }
}

/// Function declarator of a `function_definition` node
pub fn definition_declarator(definition: Node) -> Option<Node> {
    let mut cursor = definition.walk();
    definition
        .children(&mut cursor)
        .find_map(innermost_function_declarator)
}

/// Direct `parameter_list` child of a declarator
pub fn parameter_list(declarator: Node) -> Option<Node> {
    direct_child(declarator, "parameter_list")
}

/// Number of `parameter_declaration` entries in a declarator's list
///
/// None when the declarator has no parameter list at all. A `(void)` list
/// counts one parameter; an empty `()` list counts zero.
pub fn count_parameters(declarator: Node) -> Option<usize> {
    let list = parameter_list(declarator)?;
    let mut cursor = list.walk();
    Some(
        list.children(&mut cursor)
            .filter(|c| c.kind() == "parameter_declaration")
            .count(),
    )
}

/// Whether a `storage_class_specifier` child spells the given keyword
pub fn has_storage_class(node: Node, source: &str, keyword: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .any(|c| c.kind() == "storage_class_specifier" && node_text(c, source) == keyword)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Tree;

    fn parse_c(source: &str) -> Tree {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_c::LANGUAGE.into())
            .unwrap();
        parser.parse(source, None).unwrap()
    }

    #[test]
    fn test_find_identifier() {
        let source = "int add(int a, int b);\n";
        let tree = parse_c(source);
        assert_eq!(find_identifier(tree.root_node(), source), Some("add"));
    }

    #[test]
    fn test_definition_declarator_plain() {
        let source = "static int twice(int x)\n{\n    return x * 2;\n}\n";
        let tree = parse_c(source);
        let def = direct_child(tree.root_node(), "function_definition").unwrap();
        let declarator = definition_declarator(def).unwrap();
        assert_eq!(declarator.kind(), "function_declarator");
        assert_eq!(find_identifier(declarator, source), Some("twice"));
        assert_eq!(count_parameters(declarator), Some(1));
    }

    #[test]
    fn test_definition_declarator_function_pointer_return() {
        let source = "int (*pick(void))(int)\n{\n    return 0;\n}\n";
        let tree = parse_c(source);
        let def = direct_child(tree.root_node(), "function_definition").unwrap();
        let declarator = definition_declarator(def).unwrap();
        assert_eq!(find_identifier(declarator, source), Some("pick"));
        // the innermost declarator owns the (void) list, not the (int) one
        assert_eq!(count_parameters(declarator), Some(1));
    }

    #[test]
    fn test_count_parameters_empty_and_void() {
        let source = "int a()\n{\n    return 0;\n}\n\nint b(void)\n{\n    return 0;\n}\n";
        let tree = parse_c(source);
        let mut defs = Vec::new();
        collect_kind(tree.root_node(), "function_definition", &mut defs);
        assert_eq!(defs.len(), 2);
        let counts: Vec<_> = defs
            .iter()
            .map(|d| count_parameters(definition_declarator(*d).unwrap()))
            .collect();
        assert_eq!(counts, vec![Some(0), Some(1)]);
    }

    #[test]
    fn test_has_storage_class() {
        let source = "static int hidden;\nextern int shared;\nint open;\n";
        let tree = parse_c(source);
        let mut decls = Vec::new();
        collect_kind(tree.root_node(), "declaration", &mut decls);
        assert_eq!(decls.len(), 3);
        assert!(has_storage_class(decls[0], source, "static"));
        assert!(!has_storage_class(decls[0], source, "extern"));
        assert!(has_storage_class(decls[1], source, "extern"));
        assert!(!has_storage_class(decls[2], source, "static"));
    }

    #[test]
    fn test_positions_are_one_based() {
        let source = "int x;\nint y;\n";
        let tree = parse_c(source);
        let mut decls = Vec::new();
        collect_kind(tree.root_node(), "declaration", &mut decls);
        assert_eq!(start_line(decls[1]), 2);
        assert_eq!(start_column(decls[1]), 1);
    }
}
