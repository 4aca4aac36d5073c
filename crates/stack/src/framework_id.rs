crate::define_id_enum! {
    /// Web framework recognised from dependencies and config files
    FrameworkId {
        NextJs => "nextjs" : "Next.js" | "next",
        Remix => "remix" : "Remix",
        Nuxt => "nuxt" : "Nuxt",
        Astro => "astro" : "Astro",
        Vite => "vite" : "Vite",
        CreateReactApp => "create-react-app" : "Create React App" | "cra",
        Angular => "angular" : "Angular",
        SvelteKit => "sveltekit" : "SvelteKit",
        SolidStart => "solid-start" : "SolidStart",
        Express => "express" : "Express",
        Fastify => "fastify" : "Fastify",
        NestJs => "nestjs" : "NestJS",
        AdonisJs => "adonisjs" : "AdonisJS",
        ReactRouter => "react-router" : "React Router",
        TanStackStart => "tanstack-start" : "TanStack Start",
        Gatsby => "gatsby" : "Gatsby",
        Eleventy => "eleventy" : "Eleventy" | "11ty",
    }
}

impl FrameworkId {
    /// Frameworks that produce a bundle through a `build` step even when the
    /// project declares no build script.
    pub fn has_build_step(&self) -> bool {
        matches!(
            self,
            Self::NextJs
                | Self::Remix
                | Self::Nuxt
                | Self::Astro
                | Self::Vite
                | Self::CreateReactApp
                | Self::Angular
                | Self::SvelteKit
                | Self::Gatsby
        )
    }
}
