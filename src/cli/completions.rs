use clap::Parser;
use clap_complete::Shell;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    swup completions bash > ~/.bash_completion.d/swup\n\n\
                  Generate zsh completions:\n    swup completions zsh > ~/.zfunc/_swup\n\n\
                  Generate fish completions:\n    swup completions fish > ~/.config/fish/completions/swup.fish")]
pub struct CompletionsArgs {
    /// Shell type
    #[arg(value_enum, ignore_case = true)]
    pub shell: Shell,
}
