use leptos::prelude::*;
use leptos_ui::variants;

variants! {
    Button {
        base: "inline-flex items-center justify-center gap-2 whitespace-nowrap rounded-lg text-sm font-medium transition-all duration-200 disabled:pointer-events-none disabled:opacity-50 disabled:cursor-not-allowed [&_svg]:pointer-events-none [&_svg:not([class*='size-'])]:size-4 shrink-0 [&_svg]:shrink-0 outline-none focus-visible:ring-2 focus-visible:ring-indigo-500/50 hover:cursor-pointer active:scale-[0.98] touch-manipulation select-none",
        variants: {
            variant: {
                Default: "bg-gradient-to-r from-indigo-600 to-purple-600 text-white shadow-md hover:from-indigo-700 hover:to-purple-700 hover:shadow-lg",
                Destructive: "bg-gradient-to-r from-red-500 to-pink-500 text-white shadow-sm hover:from-red-600 hover:to-pink-600 hover:shadow-md",
                Outline: "border border-gray-300 bg-white text-gray-700 hover:bg-gray-50",
                Ghost: "text-gray-600 hover:bg-gray-100 hover:text-gray-900",
            },
            size: {
                Default: "h-10 px-4 py-2",
                Sm: "h-8 px-3 gap-1.5",
                Lg: "h-12 px-6 py-3",
                Icon: "size-9",
            }
        },
        component: {
            element: button,
            support_href: true,
            support_aria_current: true
        }
    }
}
