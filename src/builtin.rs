use crate::command::{Context, Control, ShellCommand};
use crate::error::{ShellError, ShellResult};
use crate::model::{DISPLAY_DATE_FORMAT, Movie, MovieDraft};
use crate::prompt::FieldPrompter;
use crate::script;
use crate::validate;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Built-in commands known to the shell at compile time.
///
/// Name, usage and arity are associated constants so the registry can validate a line before
/// any handler code runs.
pub(crate) trait Builtin: 'static {
    /// Canonical name of the command, e.g. "insert" or "show".
    const NAME: &'static str;
    const ALIASES: &'static [&'static str] = &[];
    const USAGE: &'static str;
    const ABOUT: &'static str;
    const ARITY: usize = 0;

    /// Executes the command against the session in `ctx`.
    fn run(&self, args: &[&str], ctx: &mut Context<'_>) -> ShellResult<Control>;
}

impl<T: Builtin> ShellCommand for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn aliases(&self) -> &'static [&'static str] {
        T::ALIASES
    }

    fn usage(&self) -> &'static str {
        T::USAGE
    }

    fn about(&self) -> &'static str {
        T::ABOUT
    }

    fn arity(&self) -> usize {
        T::ARITY
    }

    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> ShellResult<Control> {
        self.run(args, ctx)
    }
}

/// Every built-in, in the order `help` lists them.
pub(crate) fn all() -> Vec<Box<dyn ShellCommand>> {
    vec![
        Box::new(Help),
        Box::new(Info),
        Box::new(Show),
        Box::new(Insert),
        Box::new(Update),
        Box::new(RemoveKey),
        Box::new(Clear),
        Box::new(Save),
        Box::new(ExecuteScript),
        Box::new(Exit),
        Box::new(RemoveGreater),
        Box::new(ReplaceIfLowe),
        Box::new(RemoveLowerKey),
        Box::new(PrintAscending),
        Box::new(PrintDescending),
        Box::new(PrintFieldDescendingOscarsCount),
        Box::new(History),
    ]
}

fn parse_key(arg: &str) -> ShellResult<i32> {
    let key = validate::parse_int(arg)?;
    validate::check_key(key)?;
    Ok(key)
}

/// Prompt for a whole movie from the line source the command came from.
fn read_draft(ctx: &mut Context<'_>) -> ShellResult<MovieDraft> {
    let mode = ctx.state.mode();
    FieldPrompter::new(
        &mut *ctx.input,
        ctx.state.out.as_mut(),
        &ctx.state.passports,
        mode,
    )
    .read_draft()
}

fn print_removed(out: &mut dyn Write, count: usize) -> ShellResult<()> {
    if count == 0 {
        writeln!(out, "*no elements removed*")?;
    } else {
        writeln!(out, "*{count} elements removed successfully*")?;
    }
    Ok(())
}

fn print_movies<'m>(
    out: &mut dyn Write,
    header: &str,
    movies: impl IntoIterator<Item = &'m Movie>,
) -> ShellResult<()> {
    writeln!(out, "{header}")?;
    for movie in movies {
        writeln!(out, "{movie}")?;
    }
    Ok(())
}

fn require_non_empty(ctx: &Context<'_>) -> ShellResult<()> {
    if ctx.state.store.is_empty() {
        Err(ShellError::EmptyCollection)
    } else {
        Ok(())
    }
}

pub struct Help;

impl Builtin for Help {
    const NAME: &'static str = "help";
    const USAGE: &'static str = "help";
    const ABOUT: &'static str = "print the list of available commands";

    fn run(&self, _args: &[&str], ctx: &mut Context<'_>) -> ShellResult<Control> {
        let out = ctx.state.out.as_mut();
        writeln!(out, "*list of commands*")?;
        for command in ctx.registry.commands() {
            writeln!(out, "{:<37} : {}", format!("- {}", command.usage()), command.about())?;
        }
        Ok(Control::Continue)
    }
}

pub struct Info;

impl Builtin for Info {
    const NAME: &'static str = "info";
    const USAGE: &'static str = "info";
    const ABOUT: &'static str = "print the collection type, creation date and element count";

    fn run(&self, _args: &[&str], ctx: &mut Context<'_>) -> ShellResult<Control> {
        let store = &ctx.state.store;
        writeln!(
            ctx.state.out,
            "*Collection info*\n\
             - Type of collection   : Map of movies\n\
             - Date of initializing : {}\n\
             - Number of elements   : {}",
            store.creation_date().format(DISPLAY_DATE_FORMAT),
            store.len()
        )?;
        Ok(Control::Continue)
    }
}

pub struct Show;

impl Builtin for Show {
    const NAME: &'static str = "show";
    const USAGE: &'static str = "show";
    const ABOUT: &'static str = "print every element of the collection";

    fn run(&self, _args: &[&str], ctx: &mut Context<'_>) -> ShellResult<Control> {
        require_non_empty(ctx)?;
        let movies = ctx.state.store.iter().map(|(_, movie)| movie);
        print_movies(ctx.state.out.as_mut(), "*elements of collection*", movies)?;
        Ok(Control::Continue)
    }
}

pub struct Insert;

impl Builtin for Insert {
    const NAME: &'static str = "insert";
    const USAGE: &'static str = "insert key {element}";
    const ABOUT: &'static str = "add a new element under the given key";
    const ARITY: usize = 1;

    fn run(&self, args: &[&str], ctx: &mut Context<'_>) -> ShellResult<Control> {
        let key = parse_key(args[0])?;
        let draft = read_draft(ctx)?;
        if ctx.state.store.contains_key(key) {
            return Err(ShellError::KeyExists);
        }
        let movie = draft.build(key, &mut ctx.state.passports)?;
        ctx.state.store.put(key, movie);
        info!(key, "inserted movie");
        writeln!(ctx.state.out, "*element added successfully*")?;
        Ok(Control::Continue)
    }
}

pub struct Update;

impl Builtin for Update {
    const NAME: &'static str = "update";
    const USAGE: &'static str = "update id {element}";
    const ABOUT: &'static str = "update the element whose id equals the given one";
    const ARITY: usize = 1;

    fn run(&self, args: &[&str], ctx: &mut Context<'_>) -> ShellResult<Control> {
        let id = validate::parse_int(args[0])?;
        let draft = read_draft(ctx)?;
        let state = &mut *ctx.state;
        let movie = state.store.get_mut(id).ok_or(ShellError::IdNotFound)?;
        movie.update(draft, &mut state.passports)?;
        info!(id, "updated movie");
        writeln!(state.out, "*element updated successfully*")?;
        Ok(Control::Continue)
    }
}

pub struct RemoveKey;

impl Builtin for RemoveKey {
    const NAME: &'static str = "remove_key";
    const USAGE: &'static str = "remove_key key";
    const ABOUT: &'static str = "remove the element stored under the given key";
    const ARITY: usize = 1;

    fn run(&self, args: &[&str], ctx: &mut Context<'_>) -> ShellResult<Control> {
        let key = parse_key(args[0])?;
        ctx.state.store.remove(key).ok_or(ShellError::KeyNotFound)?;
        writeln!(ctx.state.out, "*element removed successfully*")?;
        Ok(Control::Continue)
    }
}

pub struct Clear;

impl Builtin for Clear {
    const NAME: &'static str = "clear";
    const USAGE: &'static str = "clear";
    const ABOUT: &'static str = "remove every element";

    fn run(&self, _args: &[&str], ctx: &mut Context<'_>) -> ShellResult<Control> {
        ctx.state.store.clear();
        writeln!(ctx.state.out, "*collection cleared successfully*")?;
        Ok(Control::Continue)
    }
}

pub struct Save;

impl Builtin for Save {
    const NAME: &'static str = "save";
    const USAGE: &'static str = "save";
    const ABOUT: &'static str = "write the collection to its file";

    fn run(&self, _args: &[&str], ctx: &mut Context<'_>) -> ShellResult<Control> {
        ctx.state.storage.save(&ctx.state.store)?;
        writeln!(ctx.state.out, "*collection saved successfully*")?;
        Ok(Control::Continue)
    }
}

pub struct ExecuteScript;

impl Builtin for ExecuteScript {
    const NAME: &'static str = "execute_script";
    const USAGE: &'static str = "execute_script file_name";
    const ABOUT: &'static str = "run the commands of a script file as if they were typed";
    const ARITY: usize = 1;

    fn run(&self, args: &[&str], ctx: &mut Context<'_>) -> ShellResult<Control> {
        script::execute_script(ctx.registry, ctx.state, Path::new(args[0]))
    }
}

pub struct Exit;

impl Builtin for Exit {
    const NAME: &'static str = "exit";
    const USAGE: &'static str = "exit";
    const ABOUT: &'static str = "quit without saving";

    fn run(&self, _args: &[&str], _ctx: &mut Context<'_>) -> ShellResult<Control> {
        Ok(Control::Exit)
    }
}

pub struct RemoveGreater;

impl Builtin for RemoveGreater {
    const NAME: &'static str = "remove_greater";
    const USAGE: &'static str = "remove_greater {element}";
    const ABOUT: &'static str = "remove every element with more oscars than the given one";

    fn run(&self, _args: &[&str], ctx: &mut Context<'_>) -> ShellResult<Control> {
        let draft = read_draft(ctx)?;
        let reference = draft.build_reference(&mut ctx.state.passports)?;
        let removed = ctx.state.store.remove_where_greater_than(&reference);
        print_removed(ctx.state.out.as_mut(), removed)?;
        Ok(Control::Continue)
    }
}

pub struct ReplaceIfLowe;

impl Builtin for ReplaceIfLowe {
    const NAME: &'static str = "replace_if_lowe";
    const USAGE: &'static str = "replace_if_lowe key {element}";
    const ABOUT: &'static str = "replace the element under key if the new one has fewer oscars";
    const ARITY: usize = 1;

    fn run(&self, args: &[&str], ctx: &mut Context<'_>) -> ShellResult<Control> {
        let key = parse_key(args[0])?;
        let draft = read_draft(ctx)?;
        if !ctx.state.store.contains_key(key) {
            return Err(ShellError::KeyNotFound);
        }
        let candidate = draft.build(key, &mut ctx.state.passports)?;
        if ctx.state.store.replace_if_lower(key, candidate) {
            writeln!(ctx.state.out, "*element replaced successfully*")?;
        } else {
            writeln!(ctx.state.out, "*element was not replaced*")?;
        }
        Ok(Control::Continue)
    }
}

pub struct RemoveLowerKey;

impl Builtin for RemoveLowerKey {
    const NAME: &'static str = "remove_lower_key";
    const USAGE: &'static str = "remove_lower_key key";
    const ABOUT: &'static str = "remove every element whose key is lower than the given one";
    const ARITY: usize = 1;

    fn run(&self, args: &[&str], ctx: &mut Context<'_>) -> ShellResult<Control> {
        let key = parse_key(args[0])?;
        let removed = ctx.state.store.remove_where_key_less_than(key);
        print_removed(ctx.state.out.as_mut(), removed)?;
        Ok(Control::Continue)
    }
}

pub struct PrintAscending;

impl Builtin for PrintAscending {
    const NAME: &'static str = "print_ascending";
    const USAGE: &'static str = "print_ascending";
    const ABOUT: &'static str = "print the elements by oscars count, ascending";

    fn run(&self, _args: &[&str], ctx: &mut Context<'_>) -> ShellResult<Control> {
        require_non_empty(ctx)?;
        let movies = ctx.state.store.ascending_view();
        print_movies(ctx.state.out.as_mut(), "*elements of collection ascended*", movies)?;
        Ok(Control::Continue)
    }
}

pub struct PrintDescending;

impl Builtin for PrintDescending {
    const NAME: &'static str = "print_descending";
    const USAGE: &'static str = "print_descending";
    const ABOUT: &'static str = "print the elements by oscars count, descending";

    fn run(&self, _args: &[&str], ctx: &mut Context<'_>) -> ShellResult<Control> {
        require_non_empty(ctx)?;
        let movies = ctx.state.store.descending_view();
        print_movies(ctx.state.out.as_mut(), "*elements of collection descended*", movies)?;
        Ok(Control::Continue)
    }
}

pub struct PrintFieldDescendingOscarsCount;

impl Builtin for PrintFieldDescendingOscarsCount {
    const NAME: &'static str = "print_field_descending_oscars_count";
    const USAGE: &'static str = "print_field_descending_oscars_count";
    const ABOUT: &'static str = "print the oscars count of every element, descending";

    fn run(&self, _args: &[&str], ctx: &mut Context<'_>) -> ShellResult<Control> {
        require_non_empty(ctx)?;
        let state = &mut *ctx.state;
        writeln!(state.out, "*oscars count descended*")?;
        for movie in state.store.oscars_descending_view() {
            writeln!(state.out, "{}", movie.oscars_count())?;
        }
        Ok(Control::Continue)
    }
}

pub struct History;

impl Builtin for History {
    const NAME: &'static str = "history";
    const ALIASES: &'static [&'static str] = &["print"];
    const USAGE: &'static str = "history";
    const ABOUT: &'static str = "print every command invoked so far, oldest first";

    fn run(&self, _args: &[&str], ctx: &mut Context<'_>) -> ShellResult<Control> {
        let state = &mut *ctx.state;
        writeln!(state.out, "*command history*")?;
        for entry in state.history.entries() {
            writeln!(state.out, "{entry}")?;
        }
        Ok(Control::Continue)
    }
}
