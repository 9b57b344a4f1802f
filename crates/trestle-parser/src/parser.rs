//! Recursive-descent parser for the railroad notation.
//!
//! The parser walks the token sequence with a single token of lookahead and
//! never backtracks. Dispatch happens in [`Parser::parse_component`]; content
//! loops run until dispatch produces nothing, which is how closers hand
//! control back to the construct that consumed the opener. Pragmas mutate the
//! session options in place and are filtered out of content.
//!
//! A transclusion resolves its reference through the [`Host`] and parses the
//! resolved text with a fresh parser sharing the same options instance, so a
//! pragma inside transcluded text is visible to everything parsed after it.

use log::debug;

use trestle_core::component::{Component, LinkTarget};
use trestle_core::host::Host;
use trestle_core::options::{MultipleChoiceMode, SessionOptions, TerminusStyle};

use crate::error::{ParseError, Result};
use crate::lexer;
use crate::span::Span;
use crate::tokens::{RefKind, Token, TokenKind};

/// Parse notation source into its root component.
///
/// The whole token sequence must be consumed; anything left over is a syntax
/// error. A script block becomes the sole root, short-circuiting everything
/// else.
///
/// # Errors
///
/// Returns the first lexical or syntactic failure; the parse never recovers.
pub fn parse(source: &str, options: &mut SessionOptions, host: &dyn Host) -> Result<Component> {
    let outcome = parse_internal(source, options, host)?;
    debug!(script_root = outcome.script.is_some(); "Parsed notation source");
    Ok(match outcome.script {
        Some(script) => script,
        None => Component::root(outcome.content),
    })
}

/// Content plus the script short-circuit, before root wrapping.
struct ParseOutcome {
    content: Vec<Component>,
    script: Option<Component>,
}

fn parse_internal(
    source: &str,
    options: &mut SessionOptions,
    host: &dyn Host,
) -> Result<ParseOutcome> {
    let tokens = lexer::tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        options,
        host,
        script: None,
    };
    let content = parser.parse_content()?;
    parser.check_finished()?;
    Ok(ParseOutcome {
        content,
        script: parser.script,
    })
}

/// What one dispatch step produced.
enum Produced {
    Component(Component),
    Pragma,
}

struct Parser<'opt, 'host> {
    tokens: Vec<Token>,
    pos: usize,
    options: &'opt mut SessionOptions,
    host: &'host dyn Host,
    /// Set when a script token is seen; it takes over as root.
    script: Option<Component>,
}

impl Parser<'_, '_> {
    ///////////////////////////// Dispatch

    fn parse_content(&mut self) -> Result<Vec<Component>> {
        let mut content = Vec::new();
        while let Some(produced) = self.parse_component()? {
            if let Produced::Component(component) = produced {
                content.push(component);
            }
        }
        Ok(content)
    }

    fn parse_component(&mut self) -> Result<Option<Produced>> {
        let Some(token) = self.current().cloned() else {
            return Ok(None);
        };
        let component = match token.kind {
            TokenKind::String => Some(self.parse_terminal(token)),
            TokenKind::Name => Some(self.parse_name(token)),
            TokenKind::Pragma => {
                self.parse_pragma(token)?;
                return Ok(Some(Produced::Pragma));
            }
            TokenKind::Script => Some(self.parse_script(token)),
            TokenKind::Reference(RefKind::Link) => Some(self.parse_link(token)),
            TokenKind::Reference(RefKind::Transclusion) => {
                Some(self.parse_transclusion(token)?)
            }
            TokenKind::Operator => match token.text.as_str() {
                "[" => Some(self.parse_optional()?),
                "{" => Some(self.parse_repeated()?),
                "<" => Some(self.parse_nonterminal()?),
                "(" => Some(self.parse_choice()?),
                "(-" => Some(self.parse_horizontal_choice()?),
                "($" => Some(self.parse_multiple_choice(MultipleChoiceMode::All, "$)")?),
                "(&" => Some(self.parse_multiple_choice(MultipleChoiceMode::Any, "&)")?),
                "/" => Some(self.parse_comment()?),
                "<-" => Some(self.parse_wrapped_sequence()?),
                "<^" => Some(self.parse_stack()?),
                "<!" => Some(self.parse_alternating_sequence()?),
                "<?" => Some(self.parse_optional_sequence()?),
                "-|" | "-||" => Some(self.parse_end(&token.text)),
                "-" => Some(self.parse_dummy()),
                _ => None,
            },
        };
        Ok(component.map(Produced::Component))
    }

    ///////////////////////////// Specific components

    fn parse_terminal(&mut self, token: Token) -> Component {
        self.advance();
        let (text, link) = self.split_link(token.text);
        Component::Terminal { text, link }
    }

    fn parse_name(&mut self, token: Token) -> Component {
        self.advance();
        Component::Nonterminal {
            text: token.text,
            link: None,
        }
    }

    fn parse_nonterminal(&mut self) -> Result<Component> {
        // Consume the <
        self.advance();
        let content = self.expect_name_or_string("after <")?;
        self.close(">")?;
        let (text, link) = self.split_link(content);
        Ok(Component::Nonterminal { text, link })
    }

    fn parse_comment(&mut self) -> Result<Component> {
        // Consume the /
        self.advance();
        let content = self.expect_string("after /")?;
        self.close("/")?;
        let (text, link) = self.split_link(content);
        Ok(Component::Comment { text, link })
    }

    fn parse_link(&mut self, token: Token) -> Component {
        self.advance();
        let content = token.text;
        let delim = self.options.title_link_delim.clone();
        let (label, target) = match find_delim(&content, &delim) {
            Some(split) => (
                content[..split].to_string(),
                content[split + delim.len()..].to_string(),
            ),
            None => (content.clone(), content),
        };
        Component::Link {
            child: Box::new(Component::Nonterminal {
                text: label,
                link: None,
            }),
            target: self.link_target(target),
        }
    }

    fn parse_transclusion(&mut self, token: Token) -> Result<Component> {
        self.advance();
        let reference = token.text;
        // An unknown reference transcludes as empty content.
        let source = self
            .host
            .resolve_reference(&reference)
            .unwrap_or_default();
        debug!(reference, resolved_len = source.len(); "Parsing transclusion");
        // The nested parse shares this parser's options instance.
        let nested = parse_internal(&source, self.options, self.host)?;
        Ok(Component::Transclusion {
            child: Box::new(Component::from_content(nested.content)),
        })
    }

    fn parse_script(&mut self, token: Token) -> Component {
        self.advance();
        let script = Component::Script { text: token.text };
        self.script = Some(script.clone());
        script
    }

    fn parse_optional(&mut self) -> Result<Component> {
        // Consume the [
        self.advance();
        // A { introduces the repeated (zero-or-more) form
        let repeated = self.eat("{");
        // A leading colon makes inclusion the normal route
        let normal = self.eat(":");
        let content = self.parse_content()?;
        let mut separator = None;
        if repeated && self.eat("+") {
            separator = Some(self.parse_content()?);
        }
        if repeated {
            self.close("}")?;
        }
        self.close("]")?;
        let child = Box::new(Component::from_content(content));
        Ok(if repeated {
            Component::OptionalRepeated {
                child,
                separator: separator.map(|s| Box::new(Component::from_content(s))),
                normal,
            }
        } else {
            Component::Optional { child, normal }
        })
    }

    fn parse_repeated(&mut self) -> Result<Component> {
        // Consume the {
        self.advance();
        let content = self.parse_content()?;
        let mut separator = None;
        if self.eat("+") {
            separator = Some(self.parse_content()?);
        }
        self.close("}")?;
        Ok(Component::Repeated {
            child: Box::new(Component::from_content(content)),
            separator: separator.map(|s| Box::new(Component::from_content(s))),
            arrows: self.options.show_arrows,
        })
    }

    fn parse_choice(&mut self) -> Result<Component> {
        // Consume the (
        self.advance();
        let (normal, branches) = self.parse_branches(true)?;
        self.close(")")?;
        Ok(Component::Choice { normal, branches })
    }

    fn parse_multiple_choice(
        &mut self,
        mode: MultipleChoiceMode,
        closer: &'static str,
    ) -> Result<Component> {
        // Consume the ($ or (&
        self.advance();
        let (normal, branches) = self.parse_branches(true)?;
        self.close(closer)?;
        Ok(Component::MultipleChoice {
            normal,
            mode,
            branches,
        })
    }

    fn parse_horizontal_choice(&mut self) -> Result<Component> {
        // Consume the (-
        self.advance();
        let (_, branches) = self.parse_branches(false)?;
        self.close("-)")?;
        Ok(Component::HorizontalChoice { branches })
    }

    /// Parse `|`-separated branches; when `allow_colon` is set, at most one
    /// branch may be marked as the normal route by a leading `:`.
    fn parse_branches(&mut self, allow_colon: bool) -> Result<(usize, Vec<Component>)> {
        let mut branches = Vec::new();
        let mut colon = None;
        loop {
            if allow_colon && colon.is_none() && self.eat(":") {
                colon = Some(branches.len());
            }
            branches.push(Component::from_content(self.parse_content()?));
            if !self.eat("|") {
                break;
            }
        }
        Ok((colon.unwrap_or(0), branches))
    }

    fn parse_wrapped_sequence(&mut self) -> Result<Component> {
        // Consume the <-
        self.advance();
        let content = self.parse_content()?;
        self.close("->")?;
        Ok(Component::Sequence {
            children: Component::children_or_dummy(content),
        })
    }

    fn parse_stack(&mut self) -> Result<Component> {
        // Consume the <^
        self.advance();
        let content = self.parse_content()?;
        self.close("^>")?;
        Ok(Component::Stack {
            children: Component::children_or_dummy(content),
        })
    }

    fn parse_alternating_sequence(&mut self) -> Result<Component> {
        // Consume the <!
        self.advance();
        let content = self.parse_content()?;
        self.close("!>")?;
        Ok(Component::AlternatingSequence {
            branches: Component::children_or_dummy(content),
        })
    }

    fn parse_optional_sequence(&mut self) -> Result<Component> {
        // Consume the <?
        self.advance();
        let content = self.parse_content()?;
        self.close("?>")?;
        Ok(Component::OptionalSequence {
            branches: Component::children_or_dummy(content),
        })
    }

    fn parse_end(&mut self, marker: &str) -> Component {
        let style = if marker == "-|" {
            TerminusStyle::Complex
        } else {
            TerminusStyle::Simple
        };
        self.advance();
        Component::End {
            style,
            close_eol: self.options.close_eol,
        }
    }

    fn parse_dummy(&mut self) -> Component {
        self.advance();
        Component::Dummy
    }

    ///////////////////////////// Pragmas

    fn parse_pragma(&mut self, token: Token) -> Result<()> {
        self.advance();
        match token.text.as_str() {
            "showArrows" => self.options.show_arrows = self.parse_yes_no("showArrows")?,
            "closeEol" => self.options.close_eol = self.parse_yes_no("closeEol")?,
            "debug" => self.options.debug = true,
            "start" => self.options.start = self.parse_terminus_style("start")?,
            "startLabel" => {
                self.options.start_label = Some(self.parse_setting_value("startLabel")?);
            }
            "end" => self.options.end = self.parse_terminus_style("end")?,
            "titleLinkDelim" => {
                self.options.title_link_delim = self.parse_setting_value("titleLinkDelim")?;
            }
            _ => {
                return Err(ParseError::UnknownPragma {
                    name: token.text,
                    span: token.span,
                });
            }
        }
        Ok(())
    }

    fn parse_yes_no(&mut self, pragma: &str) -> Result<bool> {
        Ok(self.parse_setting(&["yes", "no"], pragma)? == "yes")
    }

    fn parse_terminus_style(&mut self, pragma: &str) -> Result<TerminusStyle> {
        Ok(match self.parse_setting(&["simple", "complex"], pragma)?.as_str() {
            "simple" => TerminusStyle::Simple,
            _ => TerminusStyle::Complex,
        })
    }

    /// Consume a name or string token whose text is one of `allowed`.
    fn parse_setting(&mut self, allowed: &[&str], pragma: &str) -> Result<String> {
        if let Some(token) = self.current() {
            let accepted = matches!(token.kind, TokenKind::Name | TokenKind::String)
                && allowed.contains(&token.text.as_str());
            if accepted {
                return Ok(self.token_text_eaten());
            }
        }
        Err(ParseError::InvalidPragmaArgument {
            expected: allowed.join(" or "),
            pragma: pragma.to_string(),
            span: self.here(),
        })
    }

    /// Consume the string literal carrying a free-form pragma value.
    fn parse_setting_value(&mut self, pragma: &str) -> Result<String> {
        if self.at_kind(TokenKind::String) {
            return Ok(self.token_text_eaten());
        }
        Err(ParseError::InvalidPragmaArgument {
            expected: "String".to_string(),
            pragma: pragma.to_string(),
            span: self.here(),
        })
    }

    ///////////////////////////// Link helpers

    /// Split leaf text on the configured delimiter into a caption and an
    /// optional link target.
    fn split_link(&self, content: String) -> (String, Option<LinkTarget>) {
        let delim = &self.options.title_link_delim;
        match find_delim(&content, delim) {
            Some(split) => {
                let target = content[split + delim.len()..].to_string();
                let label = content[..split].to_string();
                let target = self.link_target(target);
                (label, Some(target))
            }
            None => (content, None),
        }
    }

    fn link_target(&self, target: String) -> LinkTarget {
        LinkTarget {
            external: self.host.is_external_link(&target),
            target,
        }
    }

    ///////////////////////////// Token manipulation

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn at_kind(&self, kind: TokenKind) -> bool {
        self.current().is_some_and(|token| token.kind == kind)
    }

    fn eat(&mut self, op: &str) -> bool {
        let at = self.current().is_some_and(|token| token.is_operator(op));
        if at {
            self.advance();
        }
        at
    }

    fn close(&mut self, closer: &'static str) -> Result<()> {
        if self.eat(closer) {
            Ok(())
        } else {
            Err(ParseError::MissingCloser {
                closer,
                span: self.here(),
            })
        }
    }

    fn token_text_eaten(&mut self) -> String {
        let text = self.tokens[self.pos].text.clone();
        self.advance();
        text
    }

    fn expect_string(&mut self, context: &'static str) -> Result<String> {
        if self.at_kind(TokenKind::String) {
            return Ok(self.token_text_eaten());
        }
        Err(ParseError::ExpectedToken {
            expected: "String",
            context,
            span: self.here(),
        })
    }

    fn expect_name_or_string(&mut self, context: &'static str) -> Result<String> {
        if self.at_kind(TokenKind::Name) || self.at_kind(TokenKind::String) {
            return Ok(self.token_text_eaten());
        }
        Err(ParseError::ExpectedToken {
            expected: "Name or string",
            context,
            span: self.here(),
        })
    }

    fn check_finished(&self) -> Result<()> {
        match self.current() {
            None => Ok(()),
            Some(token) => Err(ParseError::UnexpectedToken {
                found: token.text.clone(),
                span: token.span,
            }),
        }
    }

    /// The span errors point at: the current token, or the end of input.
    fn here(&self) -> Span {
        if let Some(token) = self.current() {
            return token.span;
        }
        let end = self.tokens.last().map_or(0, |token| token.span.end());
        Span::new(end..end)
    }
}

/// Locate a non-empty delimiter in leaf text.
fn find_delim(content: &str, delim: &str) -> Option<usize> {
    if delim.is_empty() {
        return None;
    }
    content.find(delim)
}
