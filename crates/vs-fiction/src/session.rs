//! The options menu resolution loop.

use tracing::{debug, error, instrument, warn};
use vs_core::NarrativeContext;

use crate::choice::OptionsMenu;
use crate::config::MenuConfig;
use crate::error::{FictionResult, MenuError};
use crate::io::{Input, Output};
use crate::meta::{MetaHandler, MetaSettings};
use crate::narrator::{Narration, Rebuff, TemplateRegistry};
use crate::outcome::{Affordances, Outcome};
use crate::parser::{ParseError, parse_command};

/// Resolves menus into outcomes, one outcome per call.
#[derive(Debug, Clone, Default)]
pub struct MenuSession<M = MetaSettings> {
    templates: TemplateRegistry,
    meta: M,
}

impl MenuSession<MetaSettings> {
    /// Create a session with default meta settings.
    pub fn new(config: MenuConfig) -> Self {
        Self {
            templates: TemplateRegistry::new(config),
            meta: MetaSettings::default(),
        }
    }
}

impl<M: MetaHandler> MenuSession<M> {
    /// Replace the meta command handler.
    pub fn with_meta_handler<N: MetaHandler>(self, meta: N) -> MenuSession<N> {
        MenuSession {
            templates: self.templates,
            meta,
        }
    }

    /// The meta command handler.
    pub fn meta(&self) -> &M {
        &self.meta
    }

    /// The menu configuration.
    pub fn config(&self) -> &MenuConfig {
        self.templates.config()
    }

    /// Render the menu and read input until one outcome resolves.
    ///
    /// `ctx` is ignored for meta menus. Without a context, conditions see
    /// no state and only meta commands are accepted as free text.
    #[instrument(skip_all, fields(options = menu.options().len(), exclusive = menu.is_exclusive()))]
    pub fn resolve(
        &mut self,
        menu: &mut OptionsMenu,
        ctx: Option<&NarrativeContext>,
        affordances: &Affordances,
        input: &mut dyn Input,
        output: &mut dyn Output,
    ) -> FictionResult<Outcome> {
        let ctx = if menu.is_meta() { None } else { ctx };
        let narration = match ctx {
            Some(ctx) if ctx.has_narrator() => Narration::Narrated,
            _ => Narration::Unnarrated,
        };

        let count = menu.available_count(ctx);
        if count == 0 {
            let shown = menu.shown_count(ctx);
            let total = menu.options().len();
            error!(shown, total, "menu has no available options");
            return Err(MenuError::NoAvailableOptions { shown, total }.into());
        }

        for line in menu.render_lines(ctx, self.templates.config()) {
            output.write_line(&line)?;
        }

        loop {
            let Some(line) = input.read_line()? else {
                error!("input closed while a menu was waiting");
                return Err(MenuError::InputClosed.into());
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Ok(choice) = line.parse::<i64>() {
                if let Some(id) = menu.choose(choice, ctx) {
                    return Ok(Outcome::Option(id));
                }
                self.rebuff(menu, Rebuff::OutOfRange { choice, count }, narration, output)?;
                continue;
            }

            match parse_command(line) {
                Ok(parsed) if parsed.is_meta() => {
                    return self.meta.handle(&parsed, output);
                }
                Ok(parsed) => match ctx {
                    Some(ctx) if !menu.is_exclusive() => {
                        let outcome = affordances.outcome(&parsed, ctx);
                        debug!(?outcome, "command resolved");
                        return Ok(outcome);
                    }
                    _ => {
                        let rebuff = Rebuff::Unavailable(parsed.canonical());
                        self.rebuff(menu, rebuff, narration, output)?;
                    }
                },
                Err(ParseError::Empty) => {}
                Err(err) => self.rebuff(menu, Rebuff::Unrecognized(err), narration, output)?,
            }
        }
    }

    fn rebuff(
        &self,
        menu: &OptionsMenu,
        rebuff: Rebuff,
        narration: Narration,
        output: &mut dyn Output,
    ) -> FictionResult<()> {
        warn!(?rebuff, ?narration, "input rebuffed");
        let text = self.templates.rebuff(&rebuff, narration, menu.rebuff());
        output.write_line(&text)?;
        Ok(())
    }
}
