use crate::application::errors::PluginError;
use crate::plugins::{Plugin, Register};

pub const KIND: &str = "hello-world";

pub struct HelloWorld;

impl Plugin for HelloWorld {
    fn description(&self) -> Option<&str> {
        Some("Replies to !helloworld")
    }
}

pub fn create(register: Register) -> Result<Box<dyn Plugin>, PluginError> {
    register.register_command("!helloworld", |message, _args| message.reply("hello, world!"))?;
    Ok(Box::new(HelloWorld))
}
