//! Manifest - MSBuild project file model
//!
//! The project file is parsed into an owned element tree so it can be
//! searched and, when the identifier is missing, rewritten with stable
//! formatting. Element names are compared by local name so that legacy
//! projects using the MSBuild default namespace resolve the same way as
//! SDK-style ones.

use crate::error::{Result, SecretsError};
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Root container element
pub const ROOT: &str = "Project";
/// Grouping element holding properties
pub const GROUP: &str = "PropertyGroup";
/// Identifier field
pub const FIELD: &str = "UserSecretsId";

/// A node in the manifest tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
}

/// An element with its attributes and children in document order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Qualified name as written (`Project`, `msb:Project`)
    pub name: String,
    /// Attributes as (qualified name, unescaped value)
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Element holding a single text child
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.children.push(Node::Text(text.into()));
        element
    }

    /// Name without namespace prefix
    pub fn local_name(&self) -> &str {
        local(&self.name)
    }

    /// Namespace prefix, if the name carries one
    pub fn prefix(&self) -> Option<&str> {
        self.name.rsplit_once(':').map(|(prefix, _)| prefix)
    }

    /// Qualify `local_name` with this element's prefix
    fn qualify(&self, local_name: &str) -> String {
        match self.prefix() {
            Some(prefix) => format!("{}:{}", prefix, local_name),
            None => local_name.to_string(),
        }
    }

    /// Child elements with the given local name.
    ///
    /// A field that occurs once and a field that occurs many times look the
    /// same through this: always a sequence, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter_map(move |node| match node {
            Node::Element(e) if e.local_name() == name => Some(e),
            _ => None,
        })
    }

    /// Character data directly inside this element.
    ///
    /// Bare text (`<Id>x</Id>`) and text wrapped in an element carrying
    /// attributes (`<Id Condition="..">x</Id>`) read the same through this.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for node in &self.children {
            match node {
                Node::Text(t) | Node::CData(t) => text.push_str(t),
                _ => {}
            }
        }
        text
    }

    fn is_blank_field(&self) -> bool {
        self.local_name() == FIELD && self.text().trim().is_empty()
    }
}

fn local(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// A parsed manifest document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Comments before the root element
    prolog: Vec<Node>,
    root: Element,
    /// Comments after the root element
    epilog: Vec<Node>,
}

impl Manifest {
    /// Parse manifest text
    pub fn parse(content: &str) -> Result<Self> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut reader = Reader::from_str(content);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| {
                SecretsError::Parse(format!("{} at position {}", e, reader.error_position()))
            })?;

            let node = match event {
                Event::Start(e) => {
                    stack.push(element_from(&e)?);
                    continue;
                }
                Event::Empty(e) => Node::Element(element_from(&e)?),
                Event::End(_) => match stack.pop() {
                    Some(mut element) => {
                        drop_layout_whitespace(&mut element);
                        Node::Element(element)
                    }
                    None => return Err(SecretsError::Parse("unexpected closing tag".to_string())),
                },
                Event::Text(e) => {
                    let text = e.unescape().map_err(|e| SecretsError::Parse(e.to_string()))?;
                    if stack.is_empty() && text.trim().is_empty() {
                        continue;
                    }
                    if stack.is_empty() {
                        return Err(SecretsError::Parse(
                            "text outside the root element".to_string(),
                        ));
                    }
                    Node::Text(text.into_owned())
                }
                Event::CData(e) => {
                    Node::CData(String::from_utf8_lossy(&e.into_inner()).into_owned())
                }
                Event::Comment(e) => {
                    Node::Comment(String::from_utf8_lossy(&e.into_inner()).into_owned())
                }
                Event::Eof => break,
                // Declaration, processing instructions and doctype are not kept
                _ => continue,
            };

            if let Some(parent) = stack.last_mut() {
                parent.children.push(node);
                continue;
            }

            match node {
                Node::Element(element) => {
                    if root.is_some() {
                        return Err(SecretsError::Parse(format!(
                            "multiple root elements (found <{}>)",
                            element.name
                        )));
                    }
                    root = Some(element);
                }
                Node::Text(_) | Node::CData(_) => {
                    return Err(SecretsError::Parse(
                        "text outside the root element".to_string(),
                    ));
                }
                comment if root.is_none() => prolog.push(comment),
                comment => epilog.push(comment),
            }
        }

        if let Some(open) = stack.last() {
            return Err(SecretsError::Parse(format!("unclosed tag <{}>", open.name)));
        }

        let root =
            root.ok_or_else(|| SecretsError::Parse("document has no root element".to_string()))?;

        Ok(Self {
            prolog,
            root,
            epilog,
        })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    fn has_project_root(&self) -> bool {
        self.root.local_name() == ROOT
    }

    /// The first non-empty identifier across all property groups
    pub fn user_secrets_id(&self) -> Option<String> {
        if !self.has_project_root() {
            return None;
        }

        self.root
            .children_named(GROUP)
            .flat_map(|group| group.children_named(FIELD))
            .map(|field| field.text().trim().to_string())
            .find(|id| !id.is_empty())
    }

    /// Store `id` in the first property group, creating one if needed.
    ///
    /// Blank identifier fields elsewhere are dropped so the document ends up
    /// with exactly one.
    pub fn set_user_secrets_id(&mut self, id: &str) -> Result<()> {
        if !self.has_project_root() {
            return Err(SecretsError::Structure(
                "Invalid manifest: no root element found".to_string(),
            ));
        }

        let field = Element::with_text(self.root.qualify(FIELD), id);

        let group_index = self.root.children.iter().position(
            |node| matches!(node, Node::Element(e) if e.local_name() == GROUP),
        );
        let group_index = match group_index {
            Some(index) => index,
            None => {
                let group = Element::new(self.root.qualify(GROUP));
                let first_element = self
                    .root
                    .children
                    .iter()
                    .position(|node| matches!(node, Node::Element(_)))
                    .unwrap_or(self.root.children.len());
                self.root
                    .children
                    .insert(first_element, Node::Element(group));
                first_element
            }
        };

        if let Some(Node::Element(group)) = self.root.children.get_mut(group_index) {
            let existing = group
                .children
                .iter()
                .position(|node| matches!(node, Node::Element(e) if e.local_name() == FIELD));
            match existing {
                Some(index) => group.children[index] = Node::Element(field),
                None => group.children.push(Node::Element(field)),
            }
        }

        for node in self.root.children.iter_mut() {
            if let Node::Element(group) = node {
                if group.local_name() == GROUP {
                    group
                        .children
                        .retain(|child| !matches!(child, Node::Element(e) if e.is_blank_field()));
                    drop_layout_whitespace(group);
                }
            }
        }
        drop_layout_whitespace(&mut self.root);

        Ok(())
    }

    /// Serialize with an XML declaration, two-space indentation and a
    /// trailing newline
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        write(&mut writer, Event::Decl(BytesDecl::new("1.0", None, None)))?;
        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;
        for node in &self.epilog {
            write_node(&mut writer, node)?;
        }

        let mut xml = String::from_utf8(writer.into_inner())
            .map_err(|e| SecretsError::Parse(e.to_string()))?;
        xml.push('\n');
        Ok(xml)
    }
}

/// Whitespace-only text between child elements is indentation and is
/// regenerated on write; in a leaf element it is the value and is kept.
fn drop_layout_whitespace(element: &mut Element) {
    let has_structure = element
        .children
        .iter()
        .any(|node| matches!(node, Node::Element(_) | Node::Comment(_)));
    if has_structure {
        element
            .children
            .retain(|node| !matches!(node, Node::Text(t) if t.trim().is_empty()));
    }
}

/// Escape character data; CR is kept as a reference so it survives
/// line-ending normalization
fn escape_text(text: &str) -> String {
    partial_escape(text).replace('\r', "&#13;")
}

/// Escape an attribute value for double quotes. Single quotes are common in
/// MSBuild conditions and stay readable; whitespace controls are written as
/// references since attribute normalization would turn them into spaces.
fn escape_attribute(value: &str) -> String {
    partial_escape(value)
        .replace('"', "&quot;")
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#9;")
}

fn element_from(start: &BytesStart) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());

    for attr in start.attributes() {
        let attr = attr.map_err(|e| SecretsError::Parse(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| SecretsError::Parse(e.to_string()))?
            .into_owned();
        element.attributes.push((key, value));
    }

    Ok(element)
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| SecretsError::Parse(format!("failed to write manifest: {}", e)))
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<()> {
    match node {
        Node::Element(element) => write_element(writer, element),
        Node::Text(text) => write(
            writer,
            Event::Text(BytesText::from_escaped(escape_text(text))),
        ),
        Node::CData(text) => write(writer, Event::CData(BytesCData::new(text.as_str()))),
        Node::Comment(text) => write(
            writer,
            Event::Comment(BytesText::from_escaped(text.as_str())),
        ),
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        let escaped = escape_attribute(value);
        start.push_attribute((key.as_bytes(), escaped.as_bytes()));
    }

    if element.children.is_empty() {
        return write(writer, Event::Empty(start));
    }

    write(writer, Event::Start(start))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    write(writer, Event::End(BytesEnd::new(element.name.as_str())))
}

/// Replace the manifest at `path` with `content`.
///
/// A symlinked manifest is resolved first so the link target is updated.
/// The new text goes to a uniquely named temporary file beside it, takes
/// over the manifest's permissions, and is then renamed over the manifest.
/// Right before the rename the manifest is read again; if it no longer
/// matches `expected` someone else wrote it in the meantime and the update
/// is abandoned with [`SecretsError::Conflict`].
pub fn replace_file(path: &Path, expected: &str, content: &str) -> Result<()> {
    let target = fs::canonicalize(path).map_err(|e| SecretsError::io(path, e))?;
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let permissions = fs::metadata(&target)
        .map_err(|e| SecretsError::io(&target, e))?
        .permissions();

    // Dropping `tmp` on any early return removes the temporary file
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| SecretsError::io(dir, e))?;
    tmp.write_all(content.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| SecretsError::io(tmp.path(), e))?;
    fs::set_permissions(tmp.path(), permissions).map_err(|e| SecretsError::io(tmp.path(), e))?;

    let current = fs::read_to_string(&target).map_err(|e| SecretsError::io(&target, e))?;
    if current != expected {
        return Err(SecretsError::Conflict(path.to_path_buf()));
    }

    tmp.persist(&target)
        .map_err(|e| SecretsError::io(&target, e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SDK_PROJECT: &str = r#"<Project Sdk="Microsoft.NET.Sdk.Web">

  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
    <Nullable>enable</Nullable>
  </PropertyGroup>

</Project>
"#;

    #[test]
    fn test_parse_tree() {
        let manifest = Manifest::parse(SDK_PROJECT).unwrap();
        let root = manifest.root();

        assert_eq!(root.name, "Project");
        assert_eq!(
            root.attributes,
            vec![("Sdk".to_string(), "Microsoft.NET.Sdk.Web".to_string())]
        );

        let groups: Vec<_> = root.children_named(GROUP).collect();
        assert_eq!(groups.len(), 1);

        let framework: Vec<_> = groups[0].children_named("TargetFramework").collect();
        assert_eq!(framework.len(), 1);
        assert_eq!(framework[0].text(), "net8.0");
    }

    #[test]
    fn test_no_identifier() {
        let manifest = Manifest::parse(SDK_PROJECT).unwrap();
        assert_eq!(manifest.user_secrets_id(), None);
    }

    #[test]
    fn test_identifier_is_trimmed() {
        let manifest = Manifest::parse(
            "<Project><PropertyGroup><UserSecretsId>\n  abc-123 \n</UserSecretsId></PropertyGroup></Project>",
        )
        .unwrap();
        assert_eq!(manifest.user_secrets_id().as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_identifier_with_attributes() {
        let manifest = Manifest::parse(
            r#"<Project>
  <PropertyGroup>
    <UserSecretsId Condition="'$(Configuration)' == 'Debug'">wrapped-id</UserSecretsId>
  </PropertyGroup>
</Project>"#,
        )
        .unwrap();
        assert_eq!(manifest.user_secrets_id().as_deref(), Some("wrapped-id"));
    }

    #[test]
    fn test_first_non_empty_identifier_wins() {
        let manifest = Manifest::parse(
            r#"<Project>
  <PropertyGroup>
    <UserSecretsId>   </UserSecretsId>
    <OutputType>Exe</OutputType>
  </PropertyGroup>
  <ItemGroup>
    <UserSecretsId>not-in-a-property-group</UserSecretsId>
  </ItemGroup>
  <PropertyGroup>
    <UserSecretsId/>
    <UserSecretsId>second</UserSecretsId>
  </PropertyGroup>
  <PropertyGroup>
    <UserSecretsId>third</UserSecretsId>
  </PropertyGroup>
</Project>"#,
        )
        .unwrap();
        assert_eq!(manifest.user_secrets_id().as_deref(), Some("second"));
    }

    #[test]
    fn test_legacy_namespaced_project() {
        let manifest = Manifest::parse(
            "\u{feff}<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             <Project ToolsVersion=\"15.0\" xmlns=\"http://schemas.microsoft.com/developer/msbuild/2003\">\n\
               <PropertyGroup>\n\
                 <UserSecretsId>aspnet-Legacy-1234</UserSecretsId>\n\
               </PropertyGroup>\n\
             </Project>\n",
        )
        .unwrap();
        assert_eq!(
            manifest.user_secrets_id().as_deref(),
            Some("aspnet-Legacy-1234")
        );
    }

    #[test]
    fn test_cdata_and_entities() {
        let manifest = Manifest::parse(
            "<Project><PropertyGroup><UserSecretsId><![CDATA[a&b]]></UserSecretsId></PropertyGroup></Project>",
        )
        .unwrap();
        assert_eq!(manifest.user_secrets_id().as_deref(), Some("a&b"));

        let manifest = Manifest::parse(
            "<Project><PropertyGroup><UserSecretsId>x&amp;y</UserSecretsId></PropertyGroup></Project>",
        )
        .unwrap();
        assert_eq!(manifest.user_secrets_id().as_deref(), Some("x&y"));
    }

    #[test]
    fn test_other_root_has_no_identifier() {
        let manifest = Manifest::parse(
            "<Solution><PropertyGroup><UserSecretsId>x</UserSecretsId></PropertyGroup></Solution>",
        )
        .unwrap();
        assert_eq!(manifest.user_secrets_id(), None);
    }

    #[test]
    fn test_malformed() {
        let cases = [
            "<Project><PropertyGroup></Project>",
            "<Project><PropertyGroup>",
            "<Project></Project><Project></Project>",
            "stray <Project></Project>",
            "",
            "   ",
        ];

        for case in cases {
            let result = Manifest::parse(case);
            assert!(
                matches!(result, Err(SecretsError::Parse(_))),
                "expected parse error for {:?}, got {:?}",
                case,
                result
            );
        }
    }

    #[test]
    fn test_set_appends_to_first_group() {
        let mut manifest = Manifest::parse(SDK_PROJECT).unwrap();
        manifest.set_user_secrets_id("my-app").unwrap();

        assert_eq!(
            manifest.to_xml().unwrap(),
            r#"<?xml version="1.0"?>
<Project Sdk="Microsoft.NET.Sdk.Web">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
    <Nullable>enable</Nullable>
    <UserSecretsId>my-app</UserSecretsId>
  </PropertyGroup>
</Project>
"#
        );
    }

    #[test]
    fn test_set_creates_group() {
        let mut manifest = Manifest::parse(
            r#"<Project Sdk="Microsoft.NET.Sdk">
  <ItemGroup>
    <PackageReference Include="Serilog" Version="3.1.1" />
  </ItemGroup>
</Project>"#,
        )
        .unwrap();
        manifest.set_user_secrets_id("fresh").unwrap();

        let groups: Vec<_> = manifest.root().children_named(GROUP).collect();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].children.len(), 1);
        assert_eq!(manifest.user_secrets_id().as_deref(), Some("fresh"));

        assert_eq!(
            manifest.to_xml().unwrap(),
            r#"<?xml version="1.0"?>
<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <UserSecretsId>fresh</UserSecretsId>
  </PropertyGroup>
  <ItemGroup>
    <PackageReference Include="Serilog" Version="3.1.1"/>
  </ItemGroup>
</Project>
"#
        );
    }

    #[test]
    fn test_set_on_empty_project() {
        let mut manifest = Manifest::parse("<Project/>").unwrap();
        manifest.set_user_secrets_id("empty").unwrap();

        let reparsed = Manifest::parse(&manifest.to_xml().unwrap()).unwrap();
        assert_eq!(reparsed.root().children_named(GROUP).count(), 1);
        assert_eq!(reparsed.user_secrets_id().as_deref(), Some("empty"));
    }

    #[test]
    fn test_set_leaves_exactly_one_field() {
        let mut manifest = Manifest::parse(
            r#"<Project>
  <PropertyGroup>
    <OutputType>Exe</OutputType>
    <UserSecretsId></UserSecretsId>
    <Nullable>enable</Nullable>
  </PropertyGroup>
  <PropertyGroup>
    <UserSecretsId/>
  </PropertyGroup>
</Project>"#,
        )
        .unwrap();
        manifest.set_user_secrets_id("only-one").unwrap();

        let fields: Vec<_> = manifest
            .root()
            .children_named(GROUP)
            .flat_map(|g| g.children_named(FIELD))
            .collect();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].text(), "only-one");

        // Replaced in place, not appended
        let first = manifest.root().children_named(GROUP).next().unwrap();
        let names: Vec<_> = first
            .children
            .iter()
            .filter_map(|n| match n {
                Node::Element(e) => Some(e.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["OutputType", "UserSecretsId", "Nullable"]);
    }

    #[test]
    fn test_set_keeps_prefix() {
        let mut manifest =
            Manifest::parse(r#"<msb:Project xmlns:msb="http://example/msbuild"></msb:Project>"#)
                .unwrap();
        manifest.set_user_secrets_id("prefixed").unwrap();

        let xml = manifest.to_xml().unwrap();
        assert!(xml.contains("<msb:PropertyGroup>"));
        assert!(xml.contains("<msb:UserSecretsId>prefixed</msb:UserSecretsId>"));
        assert_eq!(
            Manifest::parse(&xml).unwrap().user_secrets_id().as_deref(),
            Some("prefixed")
        );
    }

    #[test]
    fn test_set_requires_project_root() {
        let mut manifest = Manifest::parse("<Solution/>").unwrap();
        let err = manifest.set_user_secrets_id("x").unwrap_err();
        assert!(matches!(err, SecretsError::Structure(_)));
        assert_eq!(err.to_string(), "Invalid manifest: no root element found");
    }

    #[test]
    fn test_comments_and_escaping_survive() {
        let mut manifest = Manifest::parse(
            r#"<!-- top -->
<Project>
  <!-- props -->
  <PropertyGroup Condition="'$(Configuration)' == 'Debug'">
    <DefineConstants>A&amp;B &lt;C&gt;</DefineConstants>
  </PropertyGroup>
</Project>"#,
        )
        .unwrap();
        manifest.set_user_secrets_id("c").unwrap();

        let xml = manifest.to_xml().unwrap();
        assert!(xml.contains("<!-- top -->"));
        assert!(xml.contains("<!-- props -->"));
        assert!(xml.contains("A&amp;B &lt;C&gt;"));
        assert!(xml.contains(r#"<PropertyGroup Condition="'$(Configuration)' == 'Debug'">"#));
        assert!(!xml.contains("encoding="));
        assert!(!xml.contains("standalone="));
        assert!(xml.ends_with("</Project>\n"));
    }

    #[test]
    fn test_whitespace_values_and_references_survive() {
        let mut manifest = Manifest::parse(
            r#"<Project>
  <PropertyGroup>
    <NoWarn> </NoWarn>
  </PropertyGroup>
  <Target Name="X" Label="a&#10;b&#9;c">l1&#13;</Target>
</Project>"#,
        )
        .unwrap();
        manifest.set_user_secrets_id("ws").unwrap();

        let xml = manifest.to_xml().unwrap();
        assert!(xml.contains("    <NoWarn> </NoWarn>\n"));
        assert!(xml.contains(r#"<Target Name="X" Label="a&#10;b&#9;c">l1&#13;</Target>"#));

        let reparsed = Manifest::parse(&xml).unwrap();
        let target = reparsed.root().children_named("Target").next().unwrap();
        assert_eq!(target.attributes[1].1, "a\nb\tc");
        assert_eq!(target.text(), "l1\r");
    }

    #[test]
    fn test_blank_project_body_is_layout() {
        let mut manifest = Manifest::parse("<Project>\n</Project>").unwrap();
        manifest.set_user_secrets_id("app").unwrap();

        assert_eq!(
            manifest.to_xml().unwrap(),
            "<?xml version=\"1.0\"?>\n<Project>\n  <PropertyGroup>\n    <UserSecretsId>app</UserSecretsId>\n  </PropertyGroup>\n</Project>\n"
        );
    }

    fn entry_count(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_replace_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("App.csproj");
        fs::write(&path, "<Project/>").unwrap();

        replace_file(&path, "<Project/>", "<Project></Project>\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "<Project></Project>\n");
        assert_eq!(entry_count(dir.path()), 1);
    }

    #[test]
    fn test_replace_file_conflict() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("App.csproj");
        fs::write(&path, "<Project>edited elsewhere</Project>").unwrap();

        let err = replace_file(&path, "<Project/>", "<Project></Project>\n").unwrap_err();

        assert!(matches!(err, SecretsError::Conflict(_)));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "<Project>edited elsewhere</Project>"
        );
        assert_eq!(entry_count(dir.path()), 1);
    }

    #[test]
    fn test_replace_file_leaves_neighbours_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("App.csproj");
        let notes = dir.path().join("App.csproj.tmp");
        fs::write(&path, "<Project/>").unwrap();
        fs::write(&notes, "my notes").unwrap();

        replace_file(&path, "<Project/>", "<Project></Project>\n").unwrap();

        assert_eq!(fs::read_to_string(&notes).unwrap(), "my notes");
        assert_eq!(entry_count(dir.path()), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_file_follows_symlink() {
        let dir = tempdir().unwrap();
        let real = dir.path().join("real.csproj");
        let link = dir.path().join("App.csproj");
        fs::write(&real, "<Project/>").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        replace_file(&link, "<Project/>", "<Project></Project>\n").unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&real).unwrap(), "<Project></Project>\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_file_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("App.csproj");
        fs::write(&path, "<Project/>").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        replace_file(&path, "<Project/>", "<Project></Project>\n").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }
}
